//! Retrieval strategies and the per-collection strategy plan.

use crate::settings::EffectiveParams;
use dmem_core::Capability;
use dmem_memory::{
    CollectionInfo, Embedder, MemoryCollection, MemoryError, MetadataFilter, RawSearchResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The retrieval method that produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Native search with the metadata filter applied during retrieval.
    SearchWithFilter,
    /// Native unfiltered search.
    Search,
    /// Native query.
    Query,
    /// Similarity search by text and k, no threshold.
    SimilaritySearch,
    /// Embed the query, then recall by embedding.
    RecallMemoriesFromEmbedding,
}

impl SearchStrategy {
    /// Strategy tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchWithFilter => "search_with_filter",
            Self::Search => "search",
            Self::Query => "query",
            Self::SimilaritySearch => "similarity_search",
            Self::RecallMemoriesFromEmbedding => "recall_memories_from_embedding",
        }
    }

    /// Whether results already satisfy the request's metadata filter.
    pub fn applies_filter(&self) -> bool {
        matches!(self, Self::SearchWithFilter)
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a probe produced.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub results: Vec<RawSearchResult>,
    pub strategy: SearchStrategy,
    /// Set when the strategy embedded the query itself.
    pub query_embedding: Option<Vec<f32>>,
}

/// A collection with its strategy plan worked out once, at bind time.
pub struct BoundCollection {
    collection: Arc<dyn MemoryCollection>,
    embedder: Arc<dyn Embedder>,
    plan: Vec<SearchStrategy>,
}

impl BoundCollection {
    /// Inspect the collection's capabilities and cache the plan.
    ///
    /// Recall by embedding always closes the plan.
    pub fn bind(collection: Arc<dyn MemoryCollection>, embedder: Arc<dyn Embedder>) -> Self {
        let capabilities = collection.capabilities();
        let mut plan = Vec::with_capacity(5);

        if capabilities.contains(Capability::FilteredSearch) {
            plan.push(SearchStrategy::SearchWithFilter);
        }
        if capabilities.contains(Capability::Search)
            || capabilities.contains(Capability::FilteredSearch)
        {
            plan.push(SearchStrategy::Search);
        }
        if capabilities.contains(Capability::Query) {
            plan.push(SearchStrategy::Query);
        }
        if capabilities.contains(Capability::SimilaritySearch) {
            plan.push(SearchStrategy::SimilaritySearch);
        }
        plan.push(SearchStrategy::RecallMemoriesFromEmbedding);

        debug!(
            "Bound collection '{}' with plan [{}]",
            collection.info().collection_name,
            plan.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        );

        Self {
            collection,
            embedder,
            plan,
        }
    }

    /// Strategies in the order they are tried.
    pub fn plan(&self) -> &[SearchStrategy] {
        &self.plan
    }

    /// The underlying collection.
    pub fn collection(&self) -> &Arc<dyn MemoryCollection> {
        &self.collection
    }

    /// The query embedder.
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Collection name and embedder details.
    pub fn info(&self) -> CollectionInfo {
        self.collection.info()
    }

    /// Run the plan, stopping at the first strategy that succeeds.
    ///
    /// `filter` is offered only to native filtered search. Strategies failing
    /// with [`MemoryError::Unsupported`] or [`MemoryError::InvalidArguments`]
    /// fall through to the next one; any other failure is returned. With
    /// `use_search_method` off, recall by embedding runs directly.
    pub async fn execute(
        &self,
        query: &str,
        params: &EffectiveParams,
        filter: Option<&MetadataFilter>,
        use_search_method: bool,
    ) -> Result<ProbeOutcome, MemoryError> {
        if use_search_method {
            for &strategy in &self.plan {
                let attempt = match strategy {
                    SearchStrategy::SearchWithFilter => match filter {
                        Some(filter) => {
                            self.collection
                                .search(query, params.k, params.threshold, Some(filter))
                                .await
                        }
                        None => continue,
                    },
                    SearchStrategy::Search => {
                        self.collection
                            .search(query, params.k, params.threshold, None)
                            .await
                    }
                    SearchStrategy::Query => {
                        self.collection
                            .query(query, params.k, params.threshold)
                            .await
                    }
                    SearchStrategy::SimilaritySearch => {
                        self.collection.similarity_search(query, params.k).await
                    }
                    SearchStrategy::RecallMemoriesFromEmbedding => break,
                };

                match attempt {
                    Ok(results) => {
                        return Ok(ProbeOutcome {
                            results,
                            strategy,
                            query_embedding: None,
                        })
                    }
                    Err(e) if e.is_fallthrough() => {
                        debug!("Strategy {} skipped: {}", strategy, e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.recall(query, params).await
    }

    async fn recall(&self, query: &str, params: &EffectiveParams) -> Result<ProbeOutcome, MemoryError> {
        let embedding = self.embedder.embed_query(query).await?;
        debug!("Query embedding generated, size: {}", embedding.len());

        let results = self
            .collection
            .recall_memories_from_embedding(&embedding, params.k, params.threshold)
            .await?;

        Ok(ProbeOutcome {
            results,
            strategy: SearchStrategy::RecallMemoriesFromEmbedding,
            query_embedding: Some(embedding),
        })
    }
}
