//! Route definitions for document listing and retrieval.

use axum::routing::get;
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Document routes.
///
/// ```text
/// GET /documents           list_documents
/// GET /documents/{id}      get_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/documents", get(documents::list_documents))
        .route("/documents/{id}", get(documents::get_document))
}
