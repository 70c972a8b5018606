//! Shared DOM event dispatcher
//!
//! The host attaches one native listener per event kind and forwards each
//! event here exactly once. Observers subscribe to the kinds they handle.

use super::registry::{Registry, Subscription};
use crate::dom::{DomEvent, DomEventKind};
use std::sync::Arc;

type Handler = dyn Fn(&DomEvent) + Send + Sync;

pub struct EventDispatcher {
    pointer_down: Registry<Handler>,
    pointer_move: Registry<Handler>,
    scroll: Registry<Handler>,
    submit: Registry<Handler>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            pointer_down: Registry::new(),
            pointer_move: Registry::new(),
            scroll: Registry::new(),
            submit: Registry::new(),
        }
    }

    fn registry(&self, kind: DomEventKind) -> &Registry<Handler> {
        match kind {
            DomEventKind::PointerDown => &self.pointer_down,
            DomEventKind::PointerMove => &self.pointer_move,
            DomEventKind::Scroll => &self.scroll,
            DomEventKind::Submit => &self.submit,
        }
    }

    pub fn subscribe(
        &self,
        kind: DomEventKind,
        handler: impl Fn(&DomEvent) + Send + Sync + 'static,
    ) -> Subscription {
        tracing::trace!("Subscribing handler to {}", kind);
        self.registry(kind).insert(Arc::new(handler))
    }

    /// Deliver `event` to every handler of its kind. Returns the handler count.
    pub fn dispatch(&self, event: &DomEvent) -> usize {
        let handlers = self.registry(event.kind()).snapshot();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn listener_count(&self, kind: DomEventKind) -> usize {
        self.registry(kind).len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
