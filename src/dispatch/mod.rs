//! Event fan-out and single-slot record buffers

pub mod dispatcher;
pub mod mailbox;
pub(crate) mod registry;

pub use dispatcher::EventDispatcher;
pub use mailbox::Mailbox;
pub use registry::Subscription;
