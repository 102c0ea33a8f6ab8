//! Error types for the pantry tracker
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for pantry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the pantry tracker
#[derive(Error, Debug)]
pub enum Error {
    /// Document store read or write failed (network/auth/quota)
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Blob store write or URL retrieval failed
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// A requested document or object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Frame capture failed
    #[error("capture error: {0}")]
    Capture(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network-related errors
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific error
    #[error("backend error ({backend}): {message}")]
    Backend {
        /// Backend name
        backend: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a store-unavailable error
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create an upload-failed error
    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a capture error
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a backend-specific error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
