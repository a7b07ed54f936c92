//! Route definitions for the annotation lifecycle.

use axum::routing::post;
use axum::Router;

use crate::handlers::annotations;
use crate::state::AppState;

/// Annotation lifecycle routes.
///
/// ```text
/// POST /documents/{id}/annotations     create_annotation
/// POST /annotations/{id}/resolve       resolve_annotation
/// POST /annotations/{id}/delete        delete_annotation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/documents/{id}/annotations",
            post(annotations::create_annotation),
        )
        .route(
            "/annotations/{id}/resolve",
            post(annotations::resolve_annotation),
        )
        .route(
            "/annotations/{id}/delete",
            post(annotations::delete_annotation),
        )
}
