//! The collection interface the search pipeline queries.

use crate::error::MemoryError;
use crate::filter::MetadataFilter;
use crate::raw::RawSearchResult;
use crate::Result;
use async_trait::async_trait;
use dmem_core::Capability;
use serde::Serialize;
use std::collections::BTreeSet;

/// Descriptive information about a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub collection_name: String,

    /// Name of the embedder that produced the stored vectors.
    pub embedder_name: String,

    /// Declared vector size.
    pub embedder_size: usize,
}

/// The optional capabilities a collection exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities(BTreeSet<Capability>);

impl Capabilities {
    /// Recall by embedding only.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every optional capability.
    pub fn all() -> Self {
        Self::new(Capability::all().iter().copied())
    }

    /// Build from a list.
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self(capabilities.into_iter().collect())
    }

    /// Whether a capability is present.
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Iterate in declaration order of [`Capability`].
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

/// A vector-store collection owned by the host.
///
/// Only [`recall_memories_from_embedding`](Self::recall_memories_from_embedding)
/// is mandatory; the other retrieval methods default to
/// [`MemoryError::Unsupported`] and must be advertised through
/// [`capabilities`](Self::capabilities) when implemented.
#[async_trait]
pub trait MemoryCollection: Send + Sync {
    /// Collection name and embedder details.
    fn info(&self) -> CollectionInfo;

    /// Optional capabilities this collection implements.
    fn capabilities(&self) -> Capabilities;

    /// Unified search, optionally filtering by metadata during retrieval.
    async fn search(
        &self,
        _query: &str,
        _k: usize,
        _threshold: f64,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RawSearchResult>> {
        Err(MemoryError::Unsupported(Capability::Search))
    }

    /// Alternate naming of unified search.
    async fn query(&self, _query: &str, _k: usize, _threshold: f64) -> Result<Vec<RawSearchResult>> {
        Err(MemoryError::Unsupported(Capability::Query))
    }

    /// Similarity search by text and k.
    async fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<RawSearchResult>> {
        Err(MemoryError::Unsupported(Capability::SimilaritySearch))
    }

    /// Nearest neighbours of an explicit embedding.
    async fn recall_memories_from_embedding(
        &self,
        embedding: &[f32],
        k: usize,
        threshold: f64,
    ) -> Result<Vec<RawSearchResult>>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize> {
        Err(MemoryError::Unsupported(Capability::Count))
    }
}
