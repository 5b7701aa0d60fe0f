//! Error types for the calyx engine.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CalyxError>;

/// The unified error type for all engine operations.
#[derive(Debug, Error)]
pub enum CalyxError {
    /// The embedding step could not process the input (corrupt image,
    /// empty text, unsupported payload).
    #[error("embedding error: {0}")]
    Embedding(String),

    /// An embedding or stored vector does not match the configured
    /// dimension. Always an internal bug, never retried.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Upsert metadata failed schema validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The query input is unusable (e.g. blank text).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A lookup missed.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid engine or index configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A snapshot could not be written or restored. Restore failures
    /// leave prior in-memory state untouched.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CalyxError {
    pub fn embedding(msg: impl Into<String>) -> Self {
        CalyxError::Embedding(msg.into())
    }

    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        CalyxError::DimensionMismatch { expected, actual }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CalyxError::Validation(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        CalyxError::InvalidQuery(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CalyxError::NotFound(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        CalyxError::InvalidConfig(msg.into())
    }

    pub fn snapshot(msg: impl Into<String>) -> Self {
        CalyxError::Snapshot(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CalyxError::Internal(msg.into())
    }

    /// Whether this error should surface to the caller as a client error
    /// rather than an internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CalyxError::Embedding(_)
                | CalyxError::Validation(_)
                | CalyxError::InvalidQuery(_)
                | CalyxError::NotFound(_)
        )
    }
}
