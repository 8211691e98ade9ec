//! CLI command implementations.

pub mod config;
pub mod search;
pub mod serve;
pub mod settings;

use serde_json::Value;

/// Parse a command-line value as JSON, falling back to a plain string.
pub(crate) fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
