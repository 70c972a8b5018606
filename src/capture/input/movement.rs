use super::{pointer_record, CaptureContext, MoveRecord, PointerKind};
use crate::capture::gate::Category;
use crate::dispatch::{EventDispatcher, Mailbox, Subscription};
use crate::dom::{DomEvent, DomEventKind};

/// Captures pointer-move events as move records.
///
/// Not throttled: every qualifying move produces a record, and only the
/// mailbox's last-write-wins collapsing limits what reaches the consumer.
pub struct MoveObserver {
    mailbox: Mailbox<MoveRecord>,
    _listener: Subscription,
}

impl MoveObserver {
    /// Subscribe to pointer-move events. Capture stops when the observer is dropped.
    pub fn attach(dispatcher: &EventDispatcher, context: CaptureContext) -> Self {
        let mailbox = Mailbox::new();
        let sink = mailbox.clone();

        let listener = dispatcher.subscribe(DomEventKind::PointerMove, move |event| {
            let DomEvent::PointerMove(pointer) = event else {
                return;
            };
            if !context.gate.allows(Category::Movements) {
                return;
            }

            sink.put(MoveRecord {
                pointer: pointer_record(pointer, PointerKind::Move, &context),
            });
        });

        Self {
            mailbox,
            _listener: listener,
        }
    }

    /// Latest unconsumed record.
    pub fn record(&self) -> Option<MoveRecord> {
        self.mailbox.peek()
    }

    /// Drop the pending record once it has been consumed.
    pub fn clear(&self) {
        self.mailbox.clear();
    }

    /// Slot the coordinator listens on for new move records.
    pub fn mailbox(&self) -> &Mailbox<MoveRecord> {
        &self.mailbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::fixtures::{context, page};
    use crate::dom::{MemoryElement, PointerEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_every_move_is_published() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = MoveObserver::attach(&dispatcher, context(&page, &[Category::Movements]));

        let published = Arc::new(AtomicUsize::new(0));
        let counter = published.clone();
        let _sub = observer.mailbox().subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for i in 0..250 {
            dispatcher.dispatch(&DomEvent::PointerMove(PointerEvent::new(100.0 + i as f64, 50.0)));
        }

        assert_eq!(published.load(Ordering::SeqCst), 250);
        assert_eq!(observer.record().unwrap().pointer.page_x, 249.0);
    }

    #[test]
    fn test_move_over_plain_element() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = MoveObserver::attach(&dispatcher, context(&page, &[Category::Movements]));

        let div = MemoryElement::new("DIV").build();
        dispatcher.dispatch(&DomEvent::PointerMove(PointerEvent::new(150.0, 75.0).with_target(div)));

        let record = observer.record().unwrap();
        assert_eq!(record.pointer.kind, PointerKind::Move);
        assert!(!record.pointer.is_clickable);
        assert_eq!(record.pointer.clickable_element, None);
        assert_eq!(record.pointer.tree, None);
    }

    #[test]
    fn test_ignores_pointer_down() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = MoveObserver::attach(&dispatcher, context(&page, &[Category::Movements]));

        dispatcher.dispatch(&DomEvent::PointerDown(PointerEvent::new(1.0, 1.0)));
        assert!(observer.record().is_none());
    }
}
