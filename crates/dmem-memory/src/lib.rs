//! Memory collections and embeddings for dmem.
//!
//! This crate provides:
//! - The [`MemoryCollection`] interface and its raw result shapes
//! - Embedding generation via OpenAI-compatible APIs
//! - Local (in-process) and remote (HTTP) collections
//! - Metadata filter predicates

pub mod areas;
pub mod collection;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod filter;
pub mod local;
pub mod raw;
pub mod remote;

pub use areas::MemoryAreas;
pub use collection::{Capabilities, CollectionInfo, MemoryCollection};
pub use document::{Document, DocumentError, Metadata};
pub use embeddings::{Embedder, OpenAIEmbeddings};
pub use error::MemoryError;
pub use filter::MetadataFilter;
pub use local::LocalCollection;
pub use raw::RawSearchResult;
pub use remote::RemoteCollection;

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// A stored memory with its vector embedding.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MemoryEntry {
    /// Unique identifier.
    pub id: String,

    /// Text content.
    pub content: String,

    /// Vector embedding.
    pub embedding: Vec<f32>,

    /// Metadata.
    pub metadata: std::collections::HashMap<String, serde_json::Value>,

    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MemoryEntry {
    /// Create a new memory entry.
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            embedding,
            metadata: std::collections::HashMap::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Metadata as a JSON map, including the entry id.
    pub fn metadata_map(&self) -> Metadata {
        let mut map: Metadata = self
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        map.entry("id")
            .or_insert_with(|| serde_json::Value::String(self.id.clone()));
        map
    }

    /// The entry as a collection document.
    pub fn to_document(&self) -> Document {
        Document::new(self.content.clone(), self.metadata_map())
    }
}
