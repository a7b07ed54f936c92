//! Handlers for creating, resolving, and deleting annotations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use redline_core::{CoreError, NewAnnotation};
use redline_events::ReviewEvent;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::state::AppState;

/// Request body identifying which document an annotation belongs to.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRef {
    pub document_id: String,
}

/// POST /documents/{id}/annotations
///
/// Create an annotation on a document: appended to the annotation set and
/// inserted into the document text, then fanned out as `comment-added`.
pub async fn create_annotation(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    AppJson(input): AppJson<NewAnnotation>,
) -> AppResult<impl IntoResponse> {
    let annotation = state
        .store
        .add_annotation(&document_id, input)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "document",
            id: document_id.clone(),
        })?;

    tracing::info!(
        document_id = %document_id,
        annotation_id = %annotation.id,
        kind = annotation.kind.as_str(),
        "Annotation created"
    );

    state.event_bus.publish(
        ReviewEvent::new("comment-added").with_payload(json!({
            "documentId": document_id,
            "comment": &annotation,
        })),
    );

    Ok((StatusCode::CREATED, Json(annotation)))
}

/// POST /annotations/{id}/resolve
///
/// Mark an annotation resolved. Returns the updated annotation, or a
/// `{"error": "not found"}` marker body when the id is unknown.
pub async fn resolve_annotation(
    State(state): State<AppState>,
    Path(annotation_id): Path<String>,
    AppJson(body): AppJson<AnnotationRef>,
) -> AppResult<Response> {
    match state
        .store
        .resolve_annotation(&body.document_id, &annotation_id)
        .await?
    {
        Some(annotation) => {
            tracing::info!(
                document_id = %body.document_id,
                annotation_id = %annotation_id,
                "Annotation resolved"
            );
            Ok(Json(annotation).into_response())
        }
        None => Ok(Json(json!({ "error": "not found" })).into_response()),
    }
}

/// POST /annotations/{id}/delete
///
/// Delete an annotation from the set and strip its block from the document
/// text. Always answers `{ok: true}`; a missing id is a no-op.
pub async fn delete_annotation(
    State(state): State<AppState>,
    Path(annotation_id): Path<String>,
    AppJson(body): AppJson<AnnotationRef>,
) -> AppResult<impl IntoResponse> {
    match state
        .store
        .delete_annotation(&body.document_id, &annotation_id)
        .await?
    {
        Some(deleted) => {
            tracing::info!(
                document_id = %body.document_id,
                annotation_id = %deleted.id,
                "Annotation deleted"
            );
            state.event_bus.publish(
                ReviewEvent::new("comment-deleted").with_payload(json!({
                    "documentId": body.document_id,
                    "commentId": deleted.id,
                })),
            );
        }
        None => {
            tracing::debug!(
                document_id = %body.document_id,
                annotation_id = %annotation_id,
                "Delete requested for unknown annotation"
            );
        }
    }

    Ok(Json(json!({ "ok": true })))
}
