//! Process-local collection.

use crate::collection::{Capabilities, CollectionInfo, MemoryCollection};
use crate::embeddings::{cosine_similarity, Embedder};
use crate::error::MemoryError;
use crate::filter::MetadataFilter;
use crate::raw::RawSearchResult;
use crate::{MemoryEntry, Result};
use async_trait::async_trait;
use dmem_core::Capability;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A record in a seed file.
#[derive(Debug, Deserialize)]
struct SeedRecord {
    #[serde(default)]
    id: Option<String>,
    content: String,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

/// In-memory collection ranked by brute-force cosine similarity.
pub struct LocalCollection {
    name: String,
    embedder: Arc<dyn Embedder>,
    capabilities: Capabilities,
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl LocalCollection {
    /// Create an empty collection exposing every capability.
    pub fn new(name: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            name: name.into(),
            embedder,
            capabilities: Capabilities::all(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Restrict the advertised capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Insert an entry.
    pub async fn insert(&self, entry: MemoryEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(entry.id.clone(), entry);
    }

    /// Embed and insert content with metadata, returning the entry id.
    pub async fn add_text(
        &self,
        content: &str,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<String> {
        let embedding = self.embedder.embed_query(content).await?;
        let mut entry = MemoryEntry::new(content, embedding);
        entry.metadata = metadata;
        let id = entry.id.clone();
        self.insert(entry).await;
        Ok(id)
    }

    /// Load a JSON array of `{id?, content, metadata?}` records, embedding
    /// them in one batch. Returns the number of records loaded.
    pub async fn load_seed(&self, path: &Path) -> Result<usize> {
        let data = tokio::fs::read_to_string(path).await?;
        let records: Vec<SeedRecord> = serde_json::from_str(&data)?;
        if records.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != records.len() {
            return Err(MemoryError::Embedding(format!(
                "Expected {} embeddings, got {}",
                records.len(),
                embeddings.len()
            )));
        }

        let loaded = records.len();
        let mut entries = self.entries.write().await;
        for (record, embedding) in records.into_iter().zip(embeddings) {
            let mut entry = MemoryEntry::new(record.content, embedding);
            if let Some(id) = record.id {
                entry.id = id;
            }
            entry.metadata = record.metadata;
            entries.insert(entry.id.clone(), entry);
        }

        info!(
            "Loaded {} documents into collection '{}' from {}",
            loaded,
            self.name,
            path.display()
        );
        Ok(loaded)
    }

    fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities.contains(capability) {
            Ok(())
        } else {
            Err(MemoryError::Unsupported(capability))
        }
    }

    async fn rank(
        &self,
        embedding: &[f32],
        k: usize,
        threshold: Option<f64>,
        filter: Option<&MetadataFilter>,
    ) -> Vec<RawSearchResult> {
        let entries = self.entries.read().await;

        let mut results: Vec<(&MemoryEntry, f32)> = entries
            .values()
            .map(|entry| (entry, cosine_similarity(embedding, &entry.embedding)))
            .filter(|(_, score)| threshold.map_or(true, |t| f64::from(*score) >= t))
            .filter(|(entry, _)| match filter {
                Some(filter) => filter.matches(&entry.metadata_map()),
                None => true,
            })
            .collect();

        // Sort by score descending, id for a stable order on ties
        results.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        results.truncate(k);

        debug!("Collection '{}' ranked {} results", self.name, results.len());

        results
            .into_iter()
            .map(|(entry, score)| RawSearchResult::scored(entry.to_document(), score))
            .collect()
    }
}

#[async_trait]
impl MemoryCollection for LocalCollection {
    fn info(&self) -> CollectionInfo {
        CollectionInfo {
            collection_name: self.name.clone(),
            embedder_name: self.embedder.name().to_string(),
            embedder_size: self.embedder.dimension(),
        }
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    async fn search(
        &self,
        query: &str,
        k: usize,
        threshold: f64,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RawSearchResult>> {
        if filter.is_some() {
            if !self.capabilities.contains(Capability::FilteredSearch) {
                return Err(MemoryError::invalid_arguments(
                    "search does not accept a metadata filter",
                ));
            }
        } else if !self.capabilities.contains(Capability::Search)
            && !self.capabilities.contains(Capability::FilteredSearch)
        {
            return Err(MemoryError::Unsupported(Capability::Search));
        }

        let embedding = self.embedder.embed_query(query).await?;
        Ok(self.rank(&embedding, k, Some(threshold), filter).await)
    }

    async fn query(&self, query: &str, k: usize, threshold: f64) -> Result<Vec<RawSearchResult>> {
        self.require(Capability::Query)?;
        let embedding = self.embedder.embed_query(query).await?;

        // The query API reports hits as {document, score} objects.
        Ok(self
            .rank(&embedding, k, Some(threshold), None)
            .await
            .into_iter()
            .map(|raw| match raw {
                RawSearchResult::Pair { document, score } => {
                    RawSearchResult::Hit { document, score }
                }
                other => other,
            })
            .collect())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RawSearchResult>> {
        self.require(Capability::SimilaritySearch)?;
        let embedding = self.embedder.embed_query(query).await?;
        Ok(self.rank(&embedding, k, None, None).await)
    }

    async fn recall_memories_from_embedding(
        &self,
        embedding: &[f32],
        k: usize,
        threshold: f64,
    ) -> Result<Vec<RawSearchResult>> {
        Ok(self.rank(embedding, k, Some(threshold), None).await)
    }

    async fn count(&self) -> Result<usize> {
        self.require(Capability::Count)?;
        Ok(self.entries.read().await.len())
    }
}
