//! Memory error types.

use dmem_core::Capability;
use thiserror::Error;

/// Errors that can occur during memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedding generation failed.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The collection does not expose this capability.
    #[error("Capability not supported: {0:?}")]
    Unsupported(Capability),

    /// The capability exists but rejected the shape of the arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The backend failed while serving a supported capability.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MemoryError {
    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create an invalid-arguments error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Whether the error means "try a different strategy" rather than a failure.
    pub fn is_fallthrough(&self) -> bool {
        matches!(self, Self::Unsupported(_) | Self::InvalidArguments(_))
    }
}
