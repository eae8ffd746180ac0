//! Common error types for gitvault.

use thiserror::Error;

/// Top-level error type for gitvault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication was rejected by the forge.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network-level failure (timeout, connection reset, 5xx).
    #[error("Network error: {0}")]
    Network(String),

    /// The forge asked us to slow down.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The remote file changed between read and write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A sync pass is already in progress.
    #[error("Busy: {0}")]
    Busy(String),
}

impl Error {
    /// Whether retrying the same operation with the same inputs can
    /// plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::RateLimited(_) | Error::Io(_))
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
