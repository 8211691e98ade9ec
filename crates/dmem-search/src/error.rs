//! Search error types.

use dmem_core::MemoryArea;
use dmem_memory::MemoryError;
use dmem_plugin_sdk::PluginError;
use thiserror::Error;

/// Errors produced by the search service.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request or its effective parameters are out of bounds.
    #[error("{0}")]
    Validation(String),

    /// Stored settings are malformed or out of range.
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// No collection is bound for the area.
    #[error("No collection configured for {0} memory")]
    NoCollection(MemoryArea),

    /// A collaborator failed.
    #[error("Collection error: {0}")]
    Collection(#[from] MemoryError),

    /// The plugin host failed.
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
}

impl SearchError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the caller caused the error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Render an error with every `source()` in its chain.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
