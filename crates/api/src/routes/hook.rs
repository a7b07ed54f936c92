//! Route definitions for external hook ingestion.

use axum::routing::post;
use axum::Router;

use crate::handlers::hook;
use crate::state::AppState;

/// Hook routes.
///
/// ```text
/// POST /hook-trigger      hook_trigger
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/hook-trigger", post(hook::hook_trigger))
}
