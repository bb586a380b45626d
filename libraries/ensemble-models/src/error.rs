//! Core error types for Ensemble

use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Ensemble
#[derive(Error, Debug)]
pub enum CoreError {
    /// Caller supplied malformed input (bad field, out-of-range value)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Tracklist length limit reached; entries added before the limit remain
    #[error("Tracklist may contain at most {0} tracks")]
    TracklistFull(usize),

    /// A backend call failed or returned data violating its contract
    #[error("Backend error: {0}")]
    Backend(String),

    /// A backend declares a capability but does not implement the operation
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The coordinator actor has shut down and can no longer serve requests
    #[error("Core has shut down")]
    Shutdown,

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a not-supported error
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }
}
