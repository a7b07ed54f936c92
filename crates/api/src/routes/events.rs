//! Route definitions for the SSE subscriber endpoint.

use axum::routing::get;
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// SSE routes.
///
/// ```text
/// GET /events      subscribe (server-sent events)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(events::subscribe))
}
