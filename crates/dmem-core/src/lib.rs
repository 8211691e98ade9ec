//! # dmem-core
//!
//! Core types, configuration, and utilities for dmem.
//!
//! This crate provides shared functionality used across all dmem crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the JSON5 config file
//! - **Types**: Memory areas and collection capabilities
//! - **Utilities**: Path resolution and environment handling

pub mod config;
pub mod types;
pub mod error;
pub mod paths;
pub mod env;

// Re-exports for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
