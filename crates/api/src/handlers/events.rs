//! SSE subscriber endpoint.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

/// Keep-alive comment interval for idle SSE connections.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// GET /events
///
/// Server-sent event stream: a `connected` event on open, then every bus
/// event as it occurs. Subscribers joining late never see earlier events.
pub async fn subscribe(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.event_bus.subscribe();

    let connected = stream::once(async {
        let payload = json!({ "time": Utc::now().to_rfc3339() });
        Ok(Event::default().event("connected").data(payload.to_string()))
    });

    let updates = BroadcastStream::new(receiver).filter_map(|result| async move {
        match result {
            Ok(event) => Some(Ok(Event::default()
                .event(&event.event)
                .data(event.payload.to_string()))),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                // A slow consumer fell behind the bus buffer; drop the gap
                // and keep streaming from the current position.
                tracing::warn!(skipped, "SSE subscriber lagged");
                None
            }
        }
    });

    Sse::new(connected.chain(updates))
        .keep_alive(KeepAlive::new().interval(KEEPALIVE_INTERVAL).text("keepalive"))
}
