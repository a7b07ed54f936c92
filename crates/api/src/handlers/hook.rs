//! External hook ingestion.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use redline_events::ReviewEvent;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::state::AppState;

/// POST /hook-trigger
///
/// Accept an opaque JSON payload from an external tool and rebroadcast it
/// verbatim to every SSE subscriber as a `hook-trigger` event.
pub async fn hook_trigger(
    State(state): State<AppState>,
    AppJson(payload): AppJson<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("Hook trigger received");

    state
        .event_bus
        .publish(ReviewEvent::new("hook-trigger").with_payload(payload));

    Ok(Json(json!({ "ok": true })))
}
