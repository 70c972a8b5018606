use super::{pointer_record, CaptureContext, ClickRecord, ClickType, PointerKind};
use crate::capture::gate::Category;
use crate::dispatch::{EventDispatcher, Mailbox, Subscription};
use crate::dom::{DomEvent, DomEventKind};

/// Captures pointer-down events as click records
pub struct ClickObserver {
    mailbox: Mailbox<ClickRecord>,
    _listener: Subscription,
}

impl ClickObserver {
    /// Subscribe to pointer-down events. Capture stops when the observer is dropped.
    pub fn attach(dispatcher: &EventDispatcher, context: CaptureContext) -> Self {
        let mailbox = Mailbox::new();
        let sink = mailbox.clone();

        let listener = dispatcher.subscribe(DomEventKind::PointerDown, move |event| {
            let DomEvent::PointerDown(pointer) = event else {
                return;
            };
            if !context.gate.allows(Category::Clicks) {
                return;
            }

            let record = ClickRecord {
                pointer: pointer_record(pointer, PointerKind::Click, &context),
                click_type: ClickType::from_button(pointer.button),
            };
            if sink.put(record).is_some() {
                tracing::trace!("Unconsumed click record overwritten");
            }
        });

        Self {
            mailbox,
            _listener: listener,
        }
    }

    /// Latest unconsumed record.
    pub fn record(&self) -> Option<ClickRecord> {
        self.mailbox.peek()
    }

    /// Drop the pending record once it has been consumed.
    pub fn clear(&self) {
        self.mailbox.clear();
    }

    /// Slot the coordinator listens on for new click records.
    pub fn mailbox(&self) -> &Mailbox<ClickRecord> {
        &self.mailbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::fixtures::{context, page, NOW_MS};
    use crate::dom::{MemoryElement, PointerEvent};

    #[test]
    fn test_click_relative_to_container() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = ClickObserver::attach(&dispatcher, context(&page, &[Category::Clicks]));

        let html = MemoryElement::new("HTML").build();
        let button = MemoryElement::new("BUTTON")
            .with_attribute("data-readable", "Buy now")
            .under(&html)
            .build();
        dispatcher.dispatch(&DomEvent::PointerDown(
            PointerEvent::new(180.0, 90.0).with_button(2).with_target(button),
        ));

        let record = observer.record().expect("click recorded");
        assert_eq!(record.pointer.page_x, 80.0);
        assert_eq!(record.pointer.page_y, 40.0);
        assert_eq!(record.pointer.window_width, 1280.0);
        assert_eq!(record.pointer.timestamp, NOW_MS);
        assert_eq!(record.click_type, ClickType::Right);
        assert!(record.pointer.is_clickable);
        assert_eq!(record.pointer.clickable_element.as_deref(), Some("button"));
        assert_eq!(record.pointer.tree.as_deref(), Some("html > button"));
        assert_eq!(record.pointer.context.as_deref(), Some("Buy now"));
        assert_eq!(record.pointer.kind, PointerKind::Click);
    }

    #[test]
    fn test_disabled_category_is_noop() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = ClickObserver::attach(&dispatcher, context(&page, &[Category::Scrolls]));

        dispatcher.dispatch(&DomEvent::PointerDown(PointerEvent::new(1.0, 1.0)));
        assert!(observer.record().is_none());
    }

    #[test]
    fn test_newer_click_overwrites_and_clear_empties() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = ClickObserver::attach(&dispatcher, context(&page, &[Category::Clicks]));

        dispatcher.dispatch(&DomEvent::PointerDown(PointerEvent::new(110.0, 60.0)));
        dispatcher.dispatch(&DomEvent::PointerDown(PointerEvent::new(120.0, 70.0).with_button(1)));

        let record = observer.record().unwrap();
        assert_eq!(record.pointer.page_x, 20.0);
        assert_eq!(record.click_type, ClickType::Other);

        observer.clear();
        assert!(observer.record().is_none());
    }

    #[test]
    fn test_gate_is_read_at_event_time() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let ctx = context(&page, &[]);
        let gate = ctx.gate.clone();
        let observer = ClickObserver::attach(&dispatcher, ctx);

        dispatcher.dispatch(&DomEvent::PointerDown(PointerEvent::new(1.0, 1.0)));
        assert!(observer.record().is_none());

        gate.replace([Category::Clicks]);
        dispatcher.dispatch(&DomEvent::PointerDown(PointerEvent::new(1.0, 1.0)));
        assert!(observer.record().is_some());
    }

    #[test]
    fn test_detach_on_drop() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = ClickObserver::attach(&dispatcher, context(&page, &[Category::Clicks]));
        assert_eq!(dispatcher.listener_count(DomEventKind::PointerDown), 1);

        drop(observer);
        assert_eq!(dispatcher.listener_count(DomEventKind::PointerDown), 0);
    }
}
