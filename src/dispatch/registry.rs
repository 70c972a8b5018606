//! Handler registry shared by the dispatcher and mailboxes

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Slots<F> = Arc<Mutex<Vec<(u64, Arc<F>)>>>;

/// Ordered set of handlers. Handlers are invoked from a snapshot so they may
/// subscribe or unsubscribe re-entrantly.
pub(crate) struct Registry<F: ?Sized> {
    slots: Slots<F>,
    next_id: AtomicU64,
}

impl<F: ?Sized + Send + Sync + 'static> Registry<F> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn insert(&self, handler: Arc<F>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().push((id, handler));

        let slots = Arc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = slots.upgrade() {
                slots.lock().retain(|(slot_id, _)| *slot_id != id);
            }
        })
    }

    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.slots
            .lock()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Registration guard; dropping it removes the handler.
#[must_use = "dropping a Subscription immediately deregisters its handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Deregister now instead of at drop.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    type Counter = dyn Fn() + Send + Sync;

    #[test]
    fn test_drop_deregisters() {
        let registry: Registry<Counter> = Registry::new();
        let first = registry.insert(Arc::new(|| {}));
        let second = registry.insert(Arc::new(|| {}));
        assert_eq!(registry.len(), 2);

        drop(first);
        assert_eq!(registry.len(), 1);

        second.cancel();
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let registry: Registry<dyn Fn() -> usize + Send + Sync> = Registry::new();
        let _a = registry.insert(Arc::new(|| 1));
        let _b = registry.insert(Arc::new(|| 2));

        let values: Vec<usize> = registry.snapshot().iter().map(|h| h()).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let hits = Arc::new(AtomicUsize::new(0));
        let subscription = {
            let registry: Registry<Counter> = Registry::new();
            let hits = hits.clone();
            registry.insert(Arc::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }))
        };
        // Registry is gone; dropping the guard must not panic.
        drop(subscription);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
