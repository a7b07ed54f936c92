pub mod annotations;
pub mod documents;
pub mod events;
pub mod health;
pub mod hook;

use axum::Router;

use crate::state::AppState;

/// Build the root route tree (everything except `/health`).
///
/// ```text
/// GET  /documents                       list documents
/// GET  /documents/{id}                  fetch one document
/// POST /documents/{id}/annotations      create annotation
/// POST /annotations/{id}/resolve        resolve annotation
/// POST /annotations/{id}/delete         delete annotation
/// POST /hook-trigger                    rebroadcast external payload
/// GET  /events                          SSE subscriber stream
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(documents::router())
        .merge(annotations::router())
        .merge(events::router())
        .merge(hook::router())
}
