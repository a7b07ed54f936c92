//! Handlers for listing and fetching documents under review.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use redline_core::CoreError;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /documents
///
/// List all documents in the watched directory, newest first.
pub async fn list_documents(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let documents = state.store.list_documents().await?;
    Ok(Json(documents))
}

/// GET /documents/{id}
///
/// Fetch a single document with its annotation set, reconciled against
/// the current document text.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let document = state
        .store
        .get_document(&id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "document",
            id: id.clone(),
        })?;

    Ok(Json(document))
}
