//! Page-change watcher
//!
//! Polls the document location on a short interval and updates the page
//! record whenever the URL changes. Unlike the input observers the record
//! is never empty and is read continuously rather than drained.

use crate::capture::gate::RecordingGate;
use crate::capture::input::PageRecord;
use crate::dispatch::registry::Registry;
use crate::dispatch::Subscription;
use crate::dom::PageEnvironment;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

type Listener = dyn Fn(&PageRecord) + Send + Sync;

pub struct PageChangeWatcher {
    environment: Arc<dyn PageEnvironment>,
    gate: Arc<RecordingGate>,
    current: RwLock<PageRecord>,
    listeners: Registry<Listener>,
}

impl PageChangeWatcher {
    /// Create a watcher initialized to the current location.
    pub fn new(environment: Arc<dyn PageEnvironment>, gate: Arc<RecordingGate>) -> Arc<Self> {
        let current = PageRecord::from(environment.location());
        Arc::new(Self {
            environment,
            gate,
            current: RwLock::new(current),
            listeners: Registry::new(),
        })
    }

    pub fn current(&self) -> PageRecord {
        self.current.read().clone()
    }

    /// One polling tick. Returns true if the page record changed.
    pub fn poll_once(&self) -> bool {
        if !self.gate.page_tracking() {
            return false;
        }

        let location = self.environment.location();
        let updated = {
            let mut current = self.current.write();
            if current.url == location.url {
                return false;
            }
            *current = PageRecord::from(location);
            current.clone()
        };

        tracing::debug!("Page changed to {}", updated.url);
        for listener in self.listeners.snapshot() {
            listener(&updated);
        }
        true
    }

    pub fn subscribe(&self, listener: impl Fn(&PageRecord) + Send + Sync + 'static) -> Subscription {
        self.listeners.insert(Arc::new(listener))
    }

    /// Start polling on the current tokio runtime.
    pub fn spawn_polling(self: &Arc<Self>, interval: Duration) -> PagePoller {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let watcher = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !watcher.gate.page_tracking() {
                            break;
                        }
                        watcher.poll_once();
                    }
                    _ = token.cancelled() => break,
                }
            }
            tracing::trace!("Page polling stopped");
        });

        PagePoller {
            cancel,
            handle: Some(handle),
        }
    }
}

/// Running poll loop; cancelled on `stop` or drop.
pub struct PagePoller {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PagePoller {
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Page polling task failed: {}", e);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for PagePoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryPage;
    use parking_lot::Mutex;

    fn watcher() -> (Arc<MemoryPage>, Arc<RecordingGate>, Arc<PageChangeWatcher>) {
        let page = Arc::new(MemoryPage::new("https://shop.test/", "Shop"));
        let gate = Arc::new(RecordingGate::new());
        gate.set_page_tracking(true);
        let watcher = PageChangeWatcher::new(page.clone(), gate.clone());
        (page, gate, watcher)
    }

    #[test]
    fn test_initialized_eagerly() {
        let (_, _, watcher) = watcher();
        assert_eq!(
            watcher.current(),
            PageRecord {
                url: "https://shop.test/".to_string(),
                title: "Shop".to_string(),
            }
        );
    }

    #[test]
    fn test_updates_once_per_distinct_url() {
        let (page, _, watcher) = watcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = watcher.subscribe(move |record| sink.lock().push(record.url.clone()));

        assert!(!watcher.poll_once());
        page.navigate("https://shop.test/cart", "Cart");
        assert!(watcher.poll_once());
        assert!(!watcher.poll_once());
        assert!(!watcher.poll_once());

        assert_eq!(*seen.lock(), vec!["https://shop.test/cart".to_string()]);
        assert_eq!(watcher.current().title, "Cart");
    }

    #[test]
    fn test_title_only_change_ignored() {
        let (page, _, watcher) = watcher();
        page.navigate("https://shop.test/", "Shop (1)");
        assert!(!watcher.poll_once());
        assert_eq!(watcher.current().title, "Shop");
    }

    #[test]
    fn test_no_tracking_no_update() {
        let (page, gate, watcher) = watcher();
        gate.set_page_tracking(false);
        page.navigate("https://shop.test/cart", "Cart");
        assert!(!watcher.poll_once());
        assert_eq!(watcher.current().url, "https://shop.test/");
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_detects_navigation() {
        let (page, _, watcher) = watcher();
        let poller = watcher.spawn_polling(Duration::from_millis(50));

        page.navigate("https://shop.test/checkout", "Checkout");
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(watcher.current().url, "https://shop.test/checkout");

        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_ends_when_tracking_disabled() {
        let (_, gate, watcher) = watcher();
        let poller = watcher.spawn_polling(Duration::from_millis(50));

        gate.set_page_tracking(false);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(poller.is_finished());
    }
}
