//! Memory area and collection capability types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three memory areas a host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryArea {
    /// Long-term factual memory.
    Declarative,
    /// Conversation and interaction memory.
    Episodic,
    /// Tools and procedures memory.
    Procedural,
}

impl MemoryArea {
    /// All areas, in reporting order.
    pub const ALL: [MemoryArea; 3] = [Self::Declarative, Self::Episodic, Self::Procedural];

    /// Area name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declarative => "declarative",
            Self::Episodic => "episodic",
            Self::Procedural => "procedural",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Declarative => "Long term factual memory",
            Self::Episodic => "Conversation and interaction memory",
            Self::Procedural => "Tools and procedures memory",
        }
    }
}

impl fmt::Display for MemoryArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional retrieval capabilities a collection may expose.
///
/// Recall by embedding is not listed: every collection supports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Unified search that accepts a metadata filter.
    FilteredSearch,
    /// Unified search without a filter.
    Search,
    /// Alternate naming of unified search.
    Query,
    /// Text + k similarity search, no threshold.
    SimilaritySearch,
    /// Document count.
    Count,
}

impl Capability {
    /// Every capability.
    pub fn all() -> &'static [Capability] {
        &[
            Self::FilteredSearch,
            Self::Search,
            Self::Query,
            Self::SimilaritySearch,
            Self::Count,
        ]
    }
}
