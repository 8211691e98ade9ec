//! Collection served by a remote vector-store HTTP API.

use crate::collection::{Capabilities, CollectionInfo, MemoryCollection};
use crate::embeddings::Embedder;
use crate::error::MemoryError;
use crate::filter::MetadataFilter;
use crate::raw::RawSearchResult;
use crate::Result;
use async_trait::async_trait;
use dmem_core::Capability;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// A collection reached over HTTP.
///
/// Every optional method maps to one endpoint under the base URL. Methods
/// that were not declared in the capability list fail with
/// [`MemoryError::Unsupported`] without a request being made.
pub struct RemoteCollection {
    name: String,
    base_url: String,
    client: Client,
    embedder: Arc<dyn Embedder>,
    capabilities: Capabilities,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResultsBody {
    List(Vec<Value>),
    Wrapped { results: Vec<Value> },
}

#[derive(Deserialize)]
struct CountBody {
    count: usize,
}

impl RemoteCollection {
    /// Create a remote collection.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        embedder: Arc<dyn Embedder>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            embedder,
            capabilities,
        }
    }

    fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities.contains(capability) {
            Ok(())
        } else {
            Err(MemoryError::Unsupported(capability))
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_results(
        &self,
        capability: Capability,
        path: &str,
        body: Value,
    ) -> Result<Vec<RawSearchResult>> {
        let url = self.endpoint(path);
        debug!("POST {} on collection '{}'", url, self.name);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(capability, status, &text));
        }

        let body: ResultsBody = response.json().await?;
        Ok(parse_results(body))
    }
}

/// Map a failed response to the error the prober understands.
fn status_error(capability: Capability, status: StatusCode, body: &str) -> MemoryError {
    match status {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
            MemoryError::Unsupported(capability)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            MemoryError::invalid_arguments(format!("{}: {}", status, body))
        }
        _ => MemoryError::backend(format!("{}: {}", status, body)),
    }
}

fn parse_results(body: ResultsBody) -> Vec<RawSearchResult> {
    let items = match body {
        ResultsBody::List(items) => items,
        ResultsBody::Wrapped { results } => results,
    };
    items.into_iter().map(RawSearchResult::from_value).collect()
}

#[async_trait]
impl MemoryCollection for RemoteCollection {
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
        let capability = if filter.is_some() {
            if !self.capabilities.contains(Capability::FilteredSearch) {
                return Err(MemoryError::invalid_arguments(
                    "search does not accept a metadata filter",
                ));
            }
            Capability::FilteredSearch
        } else {
            if !self.capabilities.contains(Capability::Search)
                && !self.capabilities.contains(Capability::FilteredSearch)
            {
                return Err(MemoryError::Unsupported(Capability::Search));
            }
            Capability::Search
        };

        let mut body = json!({"query": query, "k": k, "threshold": threshold});
        if let Some(filter) = filter {
            body["filter"] = serde_json::to_value(filter)?;
        }
        self.post_results(capability, "search", body).await
    }

    async fn query(&self, query: &str, k: usize, threshold: f64) -> Result<Vec<RawSearchResult>> {
        self.require(Capability::Query)?;
        let body = json!({"query": query, "k": k, "threshold": threshold});
        self.post_results(Capability::Query, "query", body).await
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RawSearchResult>> {
        self.require(Capability::SimilaritySearch)?;
        let body = json!({"query": query, "k": k});
        self.post_results(Capability::SimilaritySearch, "similarity_search", body)
            .await
    }

    async fn recall_memories_from_embedding(
        &self,
        embedding: &[f32],
        k: usize,
        threshold: f64,
    ) -> Result<Vec<RawSearchResult>> {
        let url = self.endpoint("recall");
        debug!("POST {} on collection '{}'", url, self.name);

        let body = json!({"embedding": embedding, "k": k, "threshold": threshold});
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MemoryError::backend(format!("{}: {}", status, text)));
        }

        let body: ResultsBody = response.json().await?;
        Ok(parse_results(body))
    }

    async fn count(&self) -> Result<usize> {
        self.require(Capability::Count)?;

        let response = self.client.get(self.endpoint("count")).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(Capability::Count, status, &text));
        }

        let body: CountBody = response.json().await?;
        Ok(body.count)
    }
}
