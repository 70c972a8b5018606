//! In-process transport
//!
//! Keeps every emitted message in memory and lets the owner inject
//! lifecycle signals and directives. Hosts that relay messages over their
//! own channel can drain it with [`LoopbackTransport::take_sent`].

use super::channel::{OutboundMessage, Transport, TransportError, TransportEvent, TransportResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

#[derive(Default)]
pub struct LoopbackTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    events: Mutex<Option<mpsc::UnboundedSender<TransportEvent>>>,
    credentials: Mutex<Vec<String>>,
    connected: AtomicBool,
    reject_emits: AtomicBool,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    pub fn take_sent(&self) -> Vec<OutboundMessage> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Credentials presented on each `connect`, oldest first.
    pub fn credentials(&self) -> Vec<String> {
        self.credentials.lock().clone()
    }

    /// Deliver `event` as if it came from the server. Returns false when no
    /// connection was ever established.
    pub fn inject(&self, event: TransportEvent) -> bool {
        match self.events.lock().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Simulate the server dropping the connection.
    pub fn drop_connection(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.inject(TransportEvent::Disconnected);
        }
    }

    pub fn set_reject_emits(&self, reject: bool) {
        self.reject_emits.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn connect(
        &self,
        credential: &str,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> TransportResult<()> {
        self.credentials.lock().push(credential.to_string());
        self.connected.store(true, Ordering::SeqCst);
        events
            .send(TransportEvent::Connected)
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        *self.events.lock() = Some(events);
        Ok(())
    }

    fn emit(&self, message: &OutboundMessage) -> TransportResult<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }
        if self.reject_emits.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("rejected by loopback".to_string()));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }

    async fn disconnect(&self) -> TransportResult<()> {
        self.drop_connection();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
