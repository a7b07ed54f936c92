/// Errors surfaced by the document store.
///
/// Read paths deliberately swallow most filesystem trouble (a missing or
/// unreadable file is treated as absent); these variants cover the write
/// paths, where losing data silently is not acceptable.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
