//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Well-known variable names.
pub mod vars {
    /// Config file override.
    pub const DMEM_CONFIG: &str = "DMEM_CONFIG";

    /// Port override.
    pub const DMEM_PORT: &str = "DMEM_PORT";
}
