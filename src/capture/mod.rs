//! Interaction capture
//!
//! Observers for pointer, scroll and form events, the page-change watcher,
//! and the shared classification and gating they rely on.

pub mod classify;
pub mod gate;
pub mod input;
pub mod page;

pub use gate::{Category, RecordingGate};
pub use input::{
    CaptureContext, CapturedEvent, ClickObserver, ClickRecord, ClickType, FormObserver,
    FormRecord, MoveObserver, MoveRecord, PageRecord, PointerKind, PointerRecord,
    ScrollObserver, ScrollRecord,
};
pub use page::{PageChangeWatcher, PagePoller};
