//! Metadata filter predicates.

use crate::document::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key/value predicates over document metadata, combined with AND.
///
/// A string value starting with `*` is a suffix pattern; anything else must
/// match exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter(BTreeMap<String, Value>);

impl MetadataFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Whether there are no predicates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over predicates.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Whether `metadata` satisfies every predicate.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.0.iter().all(|(key, expected)| {
            let Some(actual) = metadata.get(key) else {
                return false;
            };

            match expected {
                Value::String(pattern) if pattern.starts_with('*') => {
                    stringify(actual).ends_with(&pattern[1..])
                }
                _ => values_equal(actual, expected),
            }
        })
    }
}

impl FromIterator<(String, Value)> for MetadataFilter {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// 1 and 1.0 are the same number to a caller.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}
