//! Declarative memory search for dmem.
//!
//! Search flows through these stages:
//! - [`settings::resolve`] merges request overrides with settings
//! - [`strategy::BoundCollection`] picks the first retrieval method that works
//! - [`filter`] applies metadata predicates the backend did not
//! - [`normalize::Normalizer`] shapes each raw result
//! - [`response::SearchResponse`] adds timing and embedder diagnostics
//!
//! [`SearchService`] runs the pipeline; [`DeclarativeMemoryPlugin`] exposes it
//! to the host together with its settings.

pub mod error;
pub mod filter;
pub mod normalize;
pub mod plugin;
pub mod request;
pub mod response;
pub mod service;
pub mod settings;
pub mod strategy;

pub use error::SearchError;
pub use normalize::{NormalizedResult, Normalizer};
pub use plugin::{DeclarativeMemoryPlugin, PLUGIN_NAME};
pub use request::{SearchQueryParams, SearchRequest};
pub use response::{EmbedderInfo, SearchParameters, SearchResponse};
pub use service::{
    AreaReport, CollectionsReport, DocumentCount, HealthReport, MemoryStats, SearchService,
};
pub use settings::{EffectiveParams, Settings};
pub use strategy::{BoundCollection, ProbeOutcome, SearchStrategy};

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
