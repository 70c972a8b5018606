//! Single-slot record mailbox
//!
//! Holds at most one pending record. A new `put` overwrites whatever the
//! consumer has not drained yet; listeners are told after every `put`.

use super::registry::{Registry, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;

type Listener<T> = dyn Fn(&Mailbox<T>) + Send + Sync;

struct MailboxInner<T> {
    slot: Mutex<Option<T>>,
    listeners: Registry<Listener<T>>,
}

pub struct Mailbox<T> {
    inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MailboxInner {
                slot: Mutex::new(None),
                listeners: Registry::new(),
            }),
        }
    }

    /// Store `value`, returning the record it displaced (if any).
    pub fn put(&self, value: T) -> Option<T> {
        let displaced = self.inner.slot.lock().replace(value);
        for listener in self.inner.listeners.snapshot() {
            listener(self);
        }
        displaced
    }

    pub fn take(&self) -> Option<T> {
        self.inner.slot.lock().take()
    }

    pub fn peek(&self) -> Option<T> {
        self.inner.slot.lock().clone()
    }

    pub fn clear(&self) {
        self.inner.slot.lock().take();
    }

    pub fn is_pending(&self) -> bool {
        self.inner.slot.lock().is_some()
    }

    /// Register a listener called after each `put`, with the lock released.
    pub fn subscribe(&self, listener: impl Fn(&Mailbox<T>) + Send + Sync + 'static) -> Subscription {
        self.inner.listeners.insert(Arc::new(listener))
    }
}

impl<T: Clone + Send + 'static> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_last_write_wins() {
        let mailbox = Mailbox::new();
        assert_eq!(mailbox.put(1), None);
        assert_eq!(mailbox.put(2), Some(1));
        assert_eq!(mailbox.take(), Some(2));
        assert!(!mailbox.is_pending());
    }

    #[test]
    fn test_listener_can_drain() {
        let mailbox: Mailbox<String> = Mailbox::new();
        let drained = Arc::new(Mutex::new(Vec::new()));

        let sink = drained.clone();
        let _sub = mailbox.subscribe(move |mb| {
            if let Some(value) = mb.take() {
                sink.lock().push(value);
            }
        });

        mailbox.put("a".to_string());
        mailbox.put("b".to_string());

        assert_eq!(*drained.lock(), vec!["a".to_string(), "b".to_string()]);
        assert!(!mailbox.is_pending());
    }

    #[test]
    fn test_listener_removed_on_drop() {
        let mailbox = Mailbox::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let sub = mailbox.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        mailbox.put(1);
        drop(sub);
        mailbox.put(2);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(mailbox.peek(), Some(2));
    }
}
