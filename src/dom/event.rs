//! DOM event values handed to the dispatcher

use super::ElementRef;
use std::sync::atomic::{AtomicBool, Ordering};

/// Event categories the collector listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEventKind {
    PointerDown,
    PointerMove,
    Scroll,
    Submit,
}

impl std::fmt::Display for DomEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomEventKind::PointerDown => write!(f, "pointerdown"),
            DomEventKind::PointerMove => write!(f, "pointermove"),
            DomEventKind::Scroll => write!(f, "scroll"),
            DomEventKind::Submit => write!(f, "submit"),
        }
    }
}

/// A native event as delivered by the host
pub enum DomEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    Scroll,
    Submit(SubmitEvent),
}

impl DomEvent {
    pub fn kind(&self) -> DomEventKind {
        match self {
            DomEvent::PointerDown(_) => DomEventKind::PointerDown,
            DomEvent::PointerMove(_) => DomEventKind::PointerMove,
            DomEvent::Scroll => DomEventKind::Scroll,
            DomEvent::Submit(_) => DomEventKind::Submit,
        }
    }
}

/// Pointer event in absolute (viewport) coordinates
#[derive(Clone)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    /// Button code: 0 = primary, 1 = auxiliary, 2 = secondary
    pub button: i16,
    pub target: Option<ElementRef>,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            button: 0,
            target: None,
        }
    }

    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }

    pub fn with_target(mut self, target: ElementRef) -> Self {
        self.target = Some(target);
        self
    }
}

/// One submitted control of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Control name; unnamed controls are not part of the submission.
    pub name: Option<String>,
    pub value: String,
    /// Input type (`text`, `password`, `email`, ...).
    pub input_type: String,
}

impl FormField {
    pub fn new(name: &str, value: &str, input_type: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            value: value.to_string(),
            input_type: input_type.to_string(),
        }
    }

    pub fn is_password(&self) -> bool {
        self.input_type.eq_ignore_ascii_case("password")
    }
}

/// Snapshot of a form at submission time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub fields: Vec<FormField>,
}

/// Form submission event
pub struct SubmitEvent {
    pub form: FormSnapshot,
    default_prevented: AtomicBool,
}

impl SubmitEvent {
    pub fn new(form: FormSnapshot) -> Self {
        Self {
            form,
            default_prevented: AtomicBool::new(false),
        }
    }

    /// Suppress the browser's native submission.
    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}
