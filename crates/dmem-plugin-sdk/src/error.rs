//! Plugin SDK error types.

use thiserror::Error;

/// Plugin SDK error type.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The plugin refused to start.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Settings rejected or unreadable.
    #[error("Settings error: {0}")]
    Settings(String),

    /// Plugin not initialized yet.
    #[error("Plugin not initialized: {0}")]
    NotInitialized(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PluginError {
    /// Create an initialization error.
    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Create a settings error.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
