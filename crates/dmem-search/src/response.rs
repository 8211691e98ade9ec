//! Response assembly.

use crate::normalize::NormalizedResult;
use crate::request::SearchRequest;
use crate::settings::EffectiveParams;
use crate::strategy::{BoundCollection, SearchStrategy};
use dmem_memory::{MemoryError, MetadataFilter};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Embedder diagnostics attached to every search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedderInfo {
    /// Embedder name as reported by the collection.
    pub name: String,
    /// Declared vector size.
    pub size: usize,
    /// Length of an actual query embedding.
    pub embedding_dimensions: usize,
}

impl EmbedderInfo {
    /// Collect embedder info, embedding `query` only when no embedding was
    /// produced during retrieval.
    pub async fn collect(
        bound: &BoundCollection,
        query_embedding: Option<&[f32]>,
        query: &str,
    ) -> Result<Self, MemoryError> {
        let info = bound.info();
        let embedding_dimensions = match query_embedding {
            Some(embedding) => embedding.len(),
            None => bound.embedder().embed_query(query).await?.len(),
        };

        Ok(Self {
            name: info.embedder_name,
            size: info.embedder_size,
            embedding_dimensions,
        })
    }
}

/// The parameters a search ran with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    pub k: usize,
    pub threshold: f64,
    pub metadata_filter: Option<MetadataFilter>,
    pub include_scores: bool,
    pub include_metadata: bool,
}

/// A search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<NormalizedResult>,
    pub total_results: usize,
    pub search_time_ms: f64,
    pub parameters: SearchParameters,
    pub embedder_info: EmbedderInfo,
    pub search_method: SearchStrategy,
}

impl SearchResponse {
    /// Build the response. Results keep their retrieval order.
    pub fn assemble(
        request: &SearchRequest,
        params: &EffectiveParams,
        results: Vec<NormalizedResult>,
        strategy: SearchStrategy,
        embedder_info: EmbedderInfo,
        started: Instant,
    ) -> Self {
        Self {
            query: request.query.clone(),
            total_results: results.len(),
            results,
            search_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            parameters: SearchParameters {
                k: params.k,
                threshold: params.threshold,
                metadata_filter: request.metadata_filter.clone(),
                include_scores: request.include_scores,
                include_metadata: request.include_metadata,
            },
            embedder_info,
            search_method: strategy,
        }
    }
}
