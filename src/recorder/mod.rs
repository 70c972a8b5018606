//! Session coordination and collector transport

pub mod channel;
pub mod coordinator;
pub mod loopback;
pub mod state;
pub mod websocket;

pub use channel::{
    EventEnvelope, OutboundMessage, PageEnvelope, Transport, TransportError, TransportEvent,
    TransportResult,
};
pub use coordinator::{CoordinatorHandle, SessionCoordinator};
pub use loopback::LoopbackTransport;
pub use state::{ConnectionState, RecordingDirective, SessionSnapshot};
pub use websocket::WsTransport;
