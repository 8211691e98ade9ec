//! Raw search results at the collection boundary.

use crate::document::Document;
use serde_json::Value;

/// A search result in the shape the collection produced it.
///
/// Scores stay as JSON values here; converting them is the normalizer's job.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSearchResult {
    /// `(document, score)` pair.
    Pair { document: Document, score: Value },

    /// Object exposing `document` and `score` fields.
    Hit { document: Document, score: Value },

    /// A document with no score.
    Bare(Document),
}

impl RawSearchResult {
    /// Pair from a typed score.
    pub fn scored(document: Document, score: f32) -> Self {
        Self::Pair {
            document,
            score: Value::from(f64::from(score)),
        }
    }

    /// Adapt a JSON value returned by a backend.
    ///
    /// Arrays of length two or more become pairs, objects with both `document`
    /// and `score` become hits, anything else is a bare document.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(mut items) if items.len() >= 2 => {
                let score = items.swap_remove(1);
                let document = items.swap_remove(0);
                Self::Pair {
                    document: Document::from_value(document),
                    score,
                }
            }
            Value::Object(mut map) if map.contains_key("document") && map.contains_key("score") => {
                let document = map.remove("document").unwrap_or(Value::Null);
                let score = map.remove("score").unwrap_or(Value::Null);
                Self::Hit {
                    document: Document::from_value(document),
                    score,
                }
            }
            other => Self::Bare(Document::from_value(other)),
        }
    }

    /// The document.
    pub fn document(&self) -> &Document {
        match self {
            Self::Pair { document, .. } | Self::Hit { document, .. } => document,
            Self::Bare(document) => document,
        }
    }

    /// The raw score, if the shape carries one.
    pub fn score(&self) -> Option<&Value> {
        match self {
            Self::Pair { score, .. } | Self::Hit { score, .. } => Some(score),
            Self::Bare(_) => None,
        }
    }
}
