//! Error types for HashBucket

use thiserror::Error;

/// Main error type for hashing operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// An argument to the hashing function was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl HashError {
    /// Shorthand for building an [`HashError::InvalidArgument`]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        HashError::InvalidArgument(msg.into())
    }
}

/// Result type alias for hashing operations
pub type Result<T> = std::result::Result<T, HashError>;
