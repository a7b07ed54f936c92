use std::sync::Arc;

use redline_events::EventBus;
use redline_store::DocumentStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Filesystem store for documents and annotation sets.
    pub store: Arc<DocumentStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus feeding the SSE subscribers.
    pub event_bus: Arc<EventBus>,
}
