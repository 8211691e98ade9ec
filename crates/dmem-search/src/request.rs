//! Search request model.

use crate::error::SearchError;
use crate::Result;
use dmem_memory::MetadataFilter;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Largest `k` a request may carry before settings are applied.
pub const MAX_REQUEST_K: usize = 100;

/// A declarative memory search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search text.
    pub query: String,

    /// Number of results. Falls back to `default_k`.
    #[serde(default)]
    pub k: Option<usize>,

    /// Similarity threshold. Falls back to `default_threshold`.
    #[serde(default)]
    pub threshold: Option<f64>,

    /// Metadata predicates.
    #[serde(default)]
    pub metadata_filter: Option<MetadataFilter>,

    /// Include similarity scores in results.
    #[serde(default = "default_true")]
    pub include_scores: bool,

    /// Include document metadata in results.
    #[serde(default = "default_true")]
    pub include_metadata: bool,
}

fn default_true() -> bool {
    true
}

impl SearchRequest {
    /// A request with every option defaulted.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: None,
            threshold: None,
            metadata_filter: None,
            include_scores: true,
            include_metadata: true,
        }
    }

    /// Set `k`.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Set the threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the metadata filter.
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.metadata_filter = Some(filter);
        self
    }

    /// Check field bounds.
    pub fn validate(&self) -> Result<()> {
        let chars = self.query.chars().count();
        if chars == 0 || chars > MAX_QUERY_CHARS {
            return Err(SearchError::validation(format!(
                "query must be between 1 and {} characters (got {})",
                MAX_QUERY_CHARS, chars
            )));
        }

        if let Some(k) = self.k {
            if !(1..=MAX_REQUEST_K).contains(&k) {
                return Err(SearchError::validation(format!(
                    "k must be between 1 and {} (got {})",
                    MAX_REQUEST_K, k
                )));
            }
        }

        if let Some(threshold) = self.threshold {
            if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                return Err(SearchError::validation(format!(
                    "threshold must be between 0.0 and 1.0 (got {})",
                    threshold
                )));
            }
        }

        if let Some(filter) = &self.metadata_filter {
            for (key, value) in filter.iter() {
                if matches!(value, Value::Array(_) | Value::Object(_)) {
                    return Err(SearchError::validation(format!(
                        "metadata_filter value for '{}' must be a scalar",
                        key
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Query-string form of a search, as sent with GET.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQueryParams {
    pub query: String,
    #[serde(default)]
    pub k: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub include_scores: bool,
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub include_metadata: bool,
}

/// Accept the usual query-string spellings of a flag, in any case:
/// `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`.
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(serde::de::Error::custom(format!(
                "invalid boolean '{}'",
                text
            ))),
        },
    }
}

impl From<SearchQueryParams> for SearchRequest {
    fn from(params: SearchQueryParams) -> Self {
        Self {
            query: params.query,
            k: params.k,
            threshold: params.threshold,
            metadata_filter: None,
            include_scores: params.include_scores,
            include_metadata: params.include_metadata,
        }
    }
}
