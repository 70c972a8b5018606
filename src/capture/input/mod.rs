//! Input observers (pointer, scroll, form)
//!
//! Each observer subscribes to one event kind on the shared dispatcher,
//! checks the recording gate first, and publishes at most one pending record
//! into its mailbox. Consumers drain the mailbox; unconsumed records are
//! overwritten by the next capture.

pub mod click;
pub mod form;
pub mod movement;
pub mod scroll;
pub mod types;

pub use click::ClickObserver;
pub use form::FormObserver;
pub use movement::MoveObserver;
pub use scroll::ScrollObserver;
pub use types::{
    CapturedEvent, ClickRecord, ClickType, FormRecord, MoveRecord, PageRecord, PointerKind,
    PointerRecord, ScrollRecord,
};

use crate::capture::classify::{classify, relative_position};
use crate::capture::gate::RecordingGate;
use crate::dom::{ElementRef, PageEnvironment, PointerEvent};
use std::sync::Arc;

/// What every observer reads at capture time
#[derive(Clone)]
pub struct CaptureContext {
    pub gate: Arc<RecordingGate>,
    pub environment: Arc<dyn PageEnvironment>,
    /// Instrumented container; coordinates are reported relative to it.
    pub container: Option<ElementRef>,
}

impl CaptureContext {
    pub fn new(
        gate: Arc<RecordingGate>,
        environment: Arc<dyn PageEnvironment>,
        container: Option<ElementRef>,
    ) -> Self {
        Self {
            gate,
            environment,
            container,
        }
    }
}

pub(crate) fn pointer_record(
    event: &PointerEvent,
    kind: PointerKind,
    context: &CaptureContext,
) -> PointerRecord {
    let container_rect = context.container.as_ref().and_then(|c| c.bounding_rect());
    let (page_x, page_y) = relative_position(event.x, event.y, container_rect);
    let viewport = context.environment.viewport();
    let classification = classify(event.target.as_ref());

    PointerRecord {
        page_x,
        page_y,
        window_width: viewport.width,
        window_height: viewport.height,
        timestamp: context.environment.now_ms(),
        is_clickable: classification.is_clickable(),
        clickable_element: classification.clickable_element,
        tree: classification.tree,
        context: classification.context,
        kind,
    }
}
