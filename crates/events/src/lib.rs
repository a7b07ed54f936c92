//! Redline event bus and change detection.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`; every SSE subscriber holds a receiver.
//! - [`ReviewEvent`] -- the canonical event envelope.
//! - [`DirWatcher`] -- polling directory watcher that publishes
//!   `file-change` events when watched markdown files appear, change, or
//!   disappear.

pub mod bus;
pub mod watcher;

pub use bus::{EventBus, ReviewEvent};
pub use watcher::DirWatcher;
