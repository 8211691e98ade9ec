//! The declarative memory search service.

use crate::error::{error_chain, SearchError};
use crate::filter;
use crate::normalize::Normalizer;
use crate::request::SearchRequest;
use crate::response::{EmbedderInfo, SearchResponse};
use crate::settings::{resolve, Settings};
use crate::strategy::{BoundCollection, SearchStrategy};
use crate::Result;
use dmem_core::{Capability, MemoryArea};
use dmem_memory::{Embedder, MemoryAreas, MemoryError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Service name reported by the health payload.
pub const SERVICE_NAME: &str = "declarative-memory-api";

/// Service version reported by the health payload.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Document count, or why there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentCount {
    Count(usize),
    Status(String),
}

/// Embedder name and declared size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedderSummary {
    pub name: String,
    pub size: usize,
}

/// Declarative memory statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub user_id: String,
    pub memory_type: MemoryArea,
    pub timestamp: f64,
    pub embedder_info: EmbedderSummary,
    pub total_documents: DocumentCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_error: Option<String>,
    pub collection_name: String,
    pub available_methods: Vec<SearchStrategy>,
}

/// One memory area in the collections report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaReport {
    Available {
        name: String,
        embedder_name: String,
        embedder_size: usize,
        description: String,
    },
    Unavailable {
        error: String,
    },
}

/// Every memory area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaReports {
    pub declarative: AreaReport,
    pub episodic: AreaReport,
    pub procedural: AreaReport,
}

/// Collections report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionsReport {
    pub collections: AreaReports,
    pub user_id: String,
    pub timestamp: f64,
}

/// Health payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// Searches the declarative collection and reports on memory areas.
pub struct SearchService {
    areas: MemoryAreas,
    bound: Option<BoundCollection>,
}

impl SearchService {
    /// Bind the declarative collection, if there is one.
    pub fn new(areas: MemoryAreas, embedder: Arc<dyn Embedder>) -> Self {
        let bound = areas
            .get(MemoryArea::Declarative)
            .cloned()
            .map(|collection| BoundCollection::bind(collection, embedder));

        if bound.is_none() {
            warn!("No declarative collection configured; searches will fail");
        }

        Self { areas, bound }
    }

    /// The bound declarative collection.
    pub fn bound(&self) -> Result<&BoundCollection> {
        self.bound
            .as_ref()
            .ok_or(SearchError::NoCollection(MemoryArea::Declarative))
    }

    /// Run a search with the given settings on behalf of `caller`.
    pub async fn search(
        &self,
        request: &SearchRequest,
        settings: &Settings,
        caller: &str,
    ) -> Result<SearchResponse> {
        self.search_since(request, settings, caller, Instant::now())
            .await
    }

    /// Like [`SearchService::search`], reporting time elapsed since `started`.
    pub async fn search_since(
        &self,
        request: &SearchRequest,
        settings: &Settings,
        caller: &str,
        started: Instant,
    ) -> Result<SearchResponse> {
        let result = self.run_search(request, settings, caller, started).await;

        if let Err(e) = &result {
            if e.is_validation() {
                warn!("Validation error in memory search for user {}: {}", caller, e);
            } else {
                error!(
                    "Error in declarative memory search for user {}: {}",
                    caller,
                    error_chain(e)
                );
            }
        }

        result
    }

    async fn run_search(
        &self,
        request: &SearchRequest,
        settings: &Settings,
        caller: &str,
        started: Instant,
    ) -> Result<SearchResponse> {
        request.validate()?;
        let params = resolve(request, settings)?;

        info!(
            "Searching declarative memory for user {}: '{}' (k={}, threshold={})",
            caller, request.query, params.k, params.threshold
        );

        let bound = self.bound()?;
        let native_filter = request
            .metadata_filter
            .as_ref()
            .filter(|f| settings.enable_metadata_filter && !f.is_empty());

        let outcome = bound
            .execute(
                &request.query,
                &params,
                native_filter,
                settings.use_search_method,
            )
            .await?;
        let strategy = outcome.strategy;

        info!(
            "Found {} results before filtering using {}",
            outcome.results.len(),
            strategy
        );

        let raw = match request.metadata_filter.as_ref() {
            Some(f) if filter::post_filter_required(Some(f), settings, strategy) => {
                filter::apply(outcome.results, f)
            }
            _ => outcome.results,
        };

        let results = Normalizer::new(request, settings).normalize_all(&raw);

        let embedder_info =
            EmbedderInfo::collect(bound, outcome.query_embedding.as_deref(), &request.query)
                .await?;

        let response =
            SearchResponse::assemble(request, &params, results, strategy, embedder_info, started);

        info!(
            "Returning {} results after filtering in {:.2}ms for user {}",
            response.total_results, response.search_time_ms, caller
        );

        Ok(response)
    }

    /// Declarative memory statistics.
    pub async fn stats(&self, caller: &str) -> Result<MemoryStats> {
        let bound = self.bound().map_err(|e| {
            error!("Error retrieving memory stats for user {}: {}", caller, e);
            e
        })?;
        let info = bound.info();

        let (total_documents, count_error) =
            if bound.collection().capabilities().contains(Capability::Count) {
                match bound.collection().count().await {
                    Ok(count) => (DocumentCount::Count(count), None),
                    Err(MemoryError::Unsupported(_)) => (method_not_available(), None),
                    Err(e) => {
                        warn!("Could not retrieve document count: {}", e);
                        (
                            DocumentCount::Status("error_counting".to_string()),
                            Some(e.to_string()),
                        )
                    }
                }
            } else {
                (method_not_available(), None)
            };

        info!("Memory stats retrieved for user {}", caller);

        Ok(MemoryStats {
            user_id: caller.to_string(),
            memory_type: MemoryArea::Declarative,
            timestamp: unix_timestamp(),
            embedder_info: EmbedderSummary {
                name: info.embedder_name,
                size: info.embedder_size,
            },
            total_documents,
            count_error,
            collection_name: info.collection_name,
            available_methods: bound.plan().to_vec(),
        })
    }

    /// Describe every memory area. Missing areas get an error placeholder.
    pub fn collections(&self, caller: &str) -> CollectionsReport {
        let report = |area: MemoryArea| match self.areas.get(area) {
            Some(collection) => {
                let info = collection.info();
                AreaReport::Available {
                    name: info.collection_name,
                    embedder_name: info.embedder_name,
                    embedder_size: info.embedder_size,
                    description: area.description().to_string(),
                }
            }
            None => AreaReport::Unavailable {
                error: SearchError::NoCollection(area).to_string(),
            },
        };

        let collections = AreaReports {
            declarative: report(MemoryArea::Declarative),
            episodic: report(MemoryArea::Episodic),
            procedural: report(MemoryArea::Procedural),
        };

        info!("Collections info retrieved for user {}", caller);

        CollectionsReport {
            collections,
            user_id: caller.to_string(),
            timestamp: unix_timestamp(),
        }
    }

    /// Fixed health payload. Touches no collaborator.
    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
            timestamp: unix_timestamp().to_string(),
        }
    }
}

fn method_not_available() -> DocumentCount {
    DocumentCount::Status("method_not_available".to_string())
}

/// Seconds since the epoch, with sub-second precision.
fn unix_timestamp() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}
