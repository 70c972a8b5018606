use super::{CaptureContext, ScrollRecord};
use crate::capture::gate::Category;
use crate::dispatch::{EventDispatcher, Mailbox, Subscription};
use crate::dom::DomEventKind;

/// Captures viewport scroll offsets
pub struct ScrollObserver {
    mailbox: Mailbox<ScrollRecord>,
    _listener: Subscription,
}

impl ScrollObserver {
    /// Subscribe to scroll events.
    pub fn attach(dispatcher: &EventDispatcher, context: CaptureContext) -> Self {
        let mailbox = Mailbox::new();
        let sink = mailbox.clone();

        let listener = dispatcher.subscribe(DomEventKind::Scroll, move |_| {
            if !context.gate.allows(Category::Scrolls) {
                return;
            }

            let viewport = context.environment.viewport();
            sink.put(ScrollRecord {
                scroll_x: viewport.scroll_x,
                scroll_y: viewport.scroll_y,
                window_width: viewport.width,
                window_height: viewport.height,
                timestamp: context.environment.now_ms(),
            });
        });

        Self {
            mailbox,
            _listener: listener,
        }
    }

    /// Latest unconsumed record.
    pub fn record(&self) -> Option<ScrollRecord> {
        self.mailbox.peek()
    }

    /// Drop the pending record once it has been consumed.
    pub fn clear(&self) {
        self.mailbox.clear();
    }

    /// Slot the coordinator listens on for new scroll records.
    pub fn mailbox(&self) -> &Mailbox<ScrollRecord> {
        &self.mailbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::fixtures::{context, page, NOW_MS};
    use crate::dom::DomEvent;

    #[test]
    fn test_scroll_samples_viewport() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = ScrollObserver::attach(&dispatcher, context(&page, &[Category::Scrolls]));

        page.scroll_to(0.0, 420.0);
        dispatcher.dispatch(&DomEvent::Scroll);

        assert_eq!(
            observer.record(),
            Some(ScrollRecord {
                scroll_x: 0.0,
                scroll_y: 420.0,
                window_width: 1280.0,
                window_height: 800.0,
                timestamp: NOW_MS,
            })
        );
    }

    #[test]
    fn test_scroll_disabled() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = ScrollObserver::attach(&dispatcher, context(&page, &[Category::Clicks]));

        dispatcher.dispatch(&DomEvent::Scroll);
        assert!(observer.record().is_none());
    }
}
