//! Shared type definitions.

mod memory;

pub use memory::{Capability, MemoryArea};
