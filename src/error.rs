use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A write collided with an existing post (duplicate slug) or with a
    /// concurrent change to the same document.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A positional reference (e.g. a comment index) is outside the collection.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
