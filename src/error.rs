use thiserror::Error;

/// Convenience result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error type returned by repository construction, fixture ingestion, and catalog pipelines.
///
/// Empty input collections are never an error: pipelines return an empty collection or the
/// `0.0` seed instead.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Underlying I/O error (e.g. fixture file not found).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Fixture document is not valid JSON or does not match the expected shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required reference or value is missing, unresolved, or out of range.
    #[error("precondition violation: {message}")]
    PreconditionViolation { message: String },
}

impl QueryError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            message: message.into(),
        }
    }
}
