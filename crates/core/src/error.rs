//! Error types for Sift.
//!
//! One error enum covers every crate in the workspace: vector index
//! invariants, persisted-file loading, collaborator failures (embedding and
//! completion services), configuration and I/O.

use thiserror::Error;

/// Unified error type for Sift.
///
/// All fallible functions return `Result<T, AppError>`. Errors are reported
/// to the immediate caller; nothing in the library logs and swallows them.
#[derive(Error, Debug)]
pub enum AppError {
    /// A vector's length disagrees with the index's established dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Malformed or incomplete persisted vector file
    #[error("Load error: {0}")]
    Load(String),

    /// Embedding provider failures
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Completion (chat model) failures
    #[error("Completion error: {0}")]
    Completion(String),

    /// Caller supplied an unusable argument (k == 0, empty vector, bad filter)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Knowledge base errors (missing bases, corpus problems)
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Shorthand for a dimension mismatch.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        AppError::DimensionMismatch { expected, actual }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
