//! Collector transport
//!
//! Defines the transport seam the session coordinator talks through, the
//! outbound wire messages, and the inbound lifecycle/directive events.

use crate::capture::{CapturedEvent, PageRecord};
use crate::recorder::state::RecordingDirective;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised by a transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timed out")]
    Timeout,

    #[error("Not connected")]
    NotConnected,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Message names on the wire
pub const EVENTS_MESSAGE: &str = "events";
pub const GET_DATA_MESSAGE: &str = "getData";
/// Alternate name a server may use to push a directive unprompted.
pub const RECORDING_MESSAGE: &str = "recording";

/// One captured interaction plus session and page details
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event: CapturedEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recordings_id: Option<i64>,
    pub url: String,
    pub title: String,
}

/// Page navigation notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    pub events: PageRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recordings_id: Option<i64>,
}

/// Messages sent to the collector
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Event(EventEnvelope),
    PageChange(PageEnvelope),
    /// Ask for the recording directive of a user; the reply arrives as
    /// [`TransportEvent::Directive`].
    GetData { user_id: String },
}

impl OutboundMessage {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundMessage::Event(_) | OutboundMessage::PageChange(_) => EVENTS_MESSAGE,
            OutboundMessage::GetData { .. } => GET_DATA_MESSAGE,
        }
    }

    pub fn payload(&self) -> TransportResult<Value> {
        let value = match self {
            OutboundMessage::Event(envelope) => serde_json::to_value(envelope)?,
            OutboundMessage::PageChange(envelope) => serde_json::to_value(envelope)?,
            OutboundMessage::GetData { user_id } => Value::String(user_id.clone()),
        };
        Ok(value)
    }

    /// Text frame: `{"event": <name>, "data": <payload>}`
    pub fn to_frame(&self) -> TransportResult<String> {
        let frame = Frame {
            event: self.name().to_string(),
            data: self.payload()?,
        };
        Ok(serde_json::to_string(&frame)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Signals delivered from the transport to the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Directive(RecordingDirective),
}

/// Decode an inbound text frame. Frames this collector does not understand
/// are skipped.
pub fn parse_frame(text: &str) -> Option<TransportEvent> {
    let frame: Frame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Discarding malformed frame: {}", e);
            return None;
        }
    };

    match frame.event.as_str() {
        GET_DATA_MESSAGE | RECORDING_MESSAGE => {
            match serde_json::from_value::<RecordingDirective>(frame.data) {
                Ok(directive) => Some(TransportEvent::Directive(directive)),
                Err(e) => {
                    tracing::warn!("Discarding malformed directive: {}", e);
                    None
                }
            }
        }
        other => {
            tracing::trace!("Ignoring inbound frame {}", other);
            None
        }
    }
}

/// Full-duplex connection to the collector.
///
/// Only the session coordinator holds a transport. Lifecycle changes and
/// server replies are pushed into the `events` channel given to `connect`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the handshake, authenticating with `credential`.
    async fn connect(
        &self,
        credential: &str,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> TransportResult<()>;

    /// Queue a message without waiting for delivery.
    fn emit(&self, message: &OutboundMessage) -> TransportResult<()>;

    async fn disconnect(&self) -> TransportResult<()>;

    fn is_connected(&self) -> bool;
}
