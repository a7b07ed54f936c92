/// Domain-level error type shared across the workspace.
///
/// The domain functions themselves are total over their inputs; the only
/// error the domain can name is a lookup miss, which the API layer maps
/// to a 404.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },
}
