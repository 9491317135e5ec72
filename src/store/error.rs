//! Storage error types.

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from embedding/report storage and alert publishing.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed embedding document: {0}")]
    Malformed(String),
}
