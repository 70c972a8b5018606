//! Host DOM seams
//!
//! The collector never talks to a browser binding directly. A host adapts its
//! document to the [`Element`] and [`PageEnvironment`] traits and feeds native
//! events in as [`DomEvent`] values.

pub mod event;
pub mod memory;

pub use event::{DomEvent, DomEventKind, FormField, FormSnapshot, PointerEvent, SubmitEvent};
pub use memory::{MemoryElement, MemoryPage};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to a host element.
pub type ElementRef = Arc<dyn Element>;

/// Bounding rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Viewport metrics at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Current document location
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub url: String,
    pub title: String,
}

/// A node of the host document.
pub trait Element: Send + Sync {
    /// Tag name as the host reports it (any case).
    fn tag_name(&self) -> String;

    /// Parent element, `None` at the document root.
    fn parent(&self) -> Option<ElementRef>;

    /// Whether an inline click handler is attached.
    fn has_click_handler(&self) -> bool;

    /// Attribute value, `None` when the attribute is not present.
    fn attribute(&self, name: &str) -> Option<String>;

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Bounding rectangle, `None` if the element is not laid out.
    fn bounding_rect(&self) -> Option<Rect> {
        None
    }
}

/// Window-level state the observers sample at capture time.
pub trait PageEnvironment: Send + Sync {
    fn viewport(&self) -> Viewport;

    fn location(&self) -> Location;

    /// Capture timestamp in epoch milliseconds.
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
