//! Clicktrail - user-interaction telemetry, streamed live.
//!
//! Instruments a container of a page, captures clicks, pointer movement,
//! scrolls, form submissions and URL changes, and forwards them to a remote
//! collector under server-issued recording directives.
//!
//! ```rust,ignore
//! let page = Arc::new(MemoryPage::new("https://shop.test/", "Shop"));
//! let transport = Arc::new(WsTransport::new(&config.endpoint));
//! let mut coordinator = SessionCoordinator::mount(config, transport, page, Some(container));
//! coordinator.connect().await?;
//! let dispatcher = coordinator.dispatcher();
//! // host: dispatcher.dispatch(&DomEvent::PointerDown(event));
//! let handle = coordinator.handle();
//! tokio::spawn(async move { coordinator.run().await });
//! handle.set_user_id("user-2");
//! ```

pub mod capture;
pub mod config;
pub mod dispatch;
pub mod dom;
pub mod recorder;

pub use capture::{Category, CapturedEvent, PageRecord};
pub use config::CollectorConfig;
pub use dispatch::{EventDispatcher, Subscription};
pub use dom::{DomEvent, Element, ElementRef, PageEnvironment};
pub use recorder::{
    ConnectionState, CoordinatorHandle, LoopbackTransport, RecordingDirective, SessionCoordinator,
    Transport, TransportError, WsTransport,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clicktrail=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Clicktrail v{} tracing initialized", env!("CARGO_PKG_VERSION"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
