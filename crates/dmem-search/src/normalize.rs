//! Raw result normalization.

use crate::request::SearchRequest;
use crate::settings::Settings;
use dmem_memory::{DocumentError, Metadata, RawSearchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// One search result in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub content: String,
    pub content_preview: Option<String>,
    pub score: Option<f64>,
    pub metadata: Option<Metadata>,
    pub document_id: Option<String>,
}

/// Why a single raw result could not be normalized.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("score is not a finite number: {0}")]
    InvalidScore(String),
}

/// Shapes raw results according to the request flags and settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    include_scores: bool,
    include_metadata: bool,
    preview_length: Option<usize>,
}

impl Normalizer {
    /// Build from a request and the current settings.
    pub fn new(request: &SearchRequest, settings: &Settings) -> Self {
        Self {
            include_scores: request.include_scores,
            include_metadata: request.include_metadata,
            preview_length: settings
                .enable_content_preview
                .then_some(settings.preview_length),
        }
    }

    /// Normalize one raw result.
    pub fn normalize(&self, raw: &RawSearchResult) -> Result<NormalizedResult, NormalizeError> {
        let document = raw.document();
        let content = document.content();

        let content_preview = self
            .preview_length
            .map(|length| preview(&content, length));

        let score = match raw.score() {
            Some(value) if self.include_scores => Some(parse_score(value)?),
            _ => None,
        };

        let metadata = if self.include_metadata {
            Some(document.metadata()?.cloned().unwrap_or_default())
        } else {
            None
        };

        let document_id = metadata
            .as_ref()
            .and_then(|m| m.get("id"))
            .and_then(document_id);

        Ok(NormalizedResult {
            content,
            content_preview,
            score,
            metadata,
            document_id,
        })
    }

    /// Normalize a batch. Items that fail are logged and skipped.
    pub fn normalize_all(&self, raws: &[RawSearchResult]) -> Vec<NormalizedResult> {
        raws.iter()
            .filter_map(|raw| match self.normalize(raw) {
                Ok(result) => Some(result),
                Err(e) => {
                    error!("Error processing memory result: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// The first `length` characters, with `...` appended when truncated.
pub fn preview(content: &str, length: usize) -> String {
    match content.char_indices().nth(length) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

fn parse_score(value: &Value) -> Result<f64, NormalizeError> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score
        .filter(|s| s.is_finite())
        .ok_or_else(|| NormalizeError::InvalidScore(value.to_string()))
}

fn document_id(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
