//! WebSocket transport
//!
//! Connects to the collector endpoint with a bearer credential on the
//! handshake request. Outbound frames go through an unbounded queue drained
//! by a writer task; a reader task decodes inbound frames.

use super::channel::{
    parse_frame, OutboundMessage, Transport, TransportError, TransportEvent, TransportResult,
};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub struct WsTransport {
    endpoint: String,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    events: Mutex<Option<mpsc::UnboundedSender<TransportEvent>>>,
    connected: Arc<AtomicBool>,
    writer: Mutex<Option<JoinHandle<()>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl WsTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            outbound: Mutex::new(None),
            events: Mutex::new(None),
            connected: Arc::new(AtomicBool::new(false)),
            writer: Mutex::new(None),
            reader: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Flip to disconnected and notify, at most once per connection.
    fn mark_disconnected(
        connected: &AtomicBool,
        events: Option<&mpsc::UnboundedSender<TransportEvent>>,
    ) {
        if connected.swap(false, Ordering::SeqCst) {
            if let Some(events) = events {
                let _ = events.send(TransportEvent::Disconnected);
            }
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(
        &self,
        credential: &str,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> TransportResult<()> {
        if self.is_connected() {
            self.disconnect().await?;
        }

        let mut request = self
            .endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::ConnectionFailed(format!("{}: {}", self.endpoint, e)))?;
        if !credential.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {}", credential))
                .map_err(|e| TransportError::InvalidCredential(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("{}: {}", self.endpoint, e)))?;
        let (mut sink, mut source) = stream.split();

        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let writer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    warn!("WebSocket send failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        *self.outbound.lock() = Some(tx);
        *self.writer.lock() = Some(writer);
        *self.events.lock() = Some(events.clone());

        // Connected must be observable before the reader can report a
        // directive or a close.
        self.connected.store(true, Ordering::SeqCst);
        events
            .send(TransportEvent::Connected)
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        info!("Connected to collector at {}", self.endpoint);

        let connected = self.connected.clone();
        let reader = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if let Some(event) = parse_frame(text.as_str()) {
                            let _ = events.send(event);
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("WebSocket closed by collector");
                        break;
                    }
                    Err(e) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            WsTransport::mark_disconnected(&connected, Some(&events));
        });
        *self.reader.lock() = Some(reader);

        Ok(())
    }

    fn emit(&self, message: &OutboundMessage) -> TransportResult<()> {
        let frame = message.to_frame()?;
        let outbound = self.outbound.lock();
        let tx = outbound.as_ref().ok_or(TransportError::NotConnected)?;
        tx.send(Message::Text(frame.into()))
            .map_err(|_| TransportError::NotConnected)
    }

    async fn disconnect(&self) -> TransportResult<()> {
        // Closing the queue lets the writer flush and send a close frame.
        self.outbound.lock().take();

        let writer = self.writer.lock().take();
        if let Some(writer) = writer {
            if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
                warn!("WebSocket writer did not drain within {:?}", WRITER_DRAIN_TIMEOUT);
            }
        }
        if let Some(reader) = self.reader.lock().take() {
            reader.abort();
        }

        let events = self.events.lock().take();
        Self::mark_disconnected(&self.connected, events.as_ref());
        info!("Disconnected from collector at {}", self.endpoint);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
