//! Plugin settings and parameter resolution.

use crate::error::SearchError;
use crate::request::SearchRequest;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Search settings, read from the host store on every request.
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Results returned when the request omits `k`.
    pub default_k: usize,

    /// Threshold used when the request omits one.
    pub default_threshold: f64,

    /// Largest `k` a request may resolve to.
    pub max_k: usize,

    /// Allow filtering results by metadata.
    pub enable_metadata_filter: bool,

    /// Include a content preview in results.
    pub enable_content_preview: bool,

    /// Preview length in characters.
    pub preview_length: usize,

    /// Probe the collection's native search methods before falling back to
    /// recall by embedding.
    pub use_search_method: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_k: 5,
            default_threshold: 0.7,
            max_k: 20,
            enable_metadata_filter: true,
            enable_content_preview: true,
            preview_length: 200,
            use_search_method: true,
        }
    }
}

/// Bounds for the integer settings.
const DEFAULT_K_RANGE: (usize, usize) = (1, 50);
const MAX_K_RANGE: (usize, usize) = (1, 100);
const PREVIEW_LENGTH_RANGE: (usize, usize) = (50, 1000);

impl Settings {
    /// Parse a stored settings document and validate it.
    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let settings: Settings =
            serde_json::from_value(value).map_err(|e| SearchError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Copy with one key replaced, validated. Unknown keys are rejected.
    pub fn with_value(&self, key: &str, value: Value) -> Result<Self> {
        let mut document = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Default::default(),
            Err(e) => return Err(SearchError::Settings(e.to_string())),
        };
        if !document.contains_key(key) {
            return Err(SearchError::Settings(format!("unknown setting '{}'", key)));
        }
        document.insert(key.to_string(), value);
        Self::from_value(Value::Object(document))
    }

    /// Check every bounded field, reporting all violations at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        check_range(&mut errors, "default_k", self.default_k, DEFAULT_K_RANGE);
        check_range(&mut errors, "max_k", self.max_k, MAX_K_RANGE);
        check_range(
            &mut errors,
            "preview_length",
            self.preview_length,
            PREVIEW_LENGTH_RANGE,
        );

        if !self.default_threshold.is_finite() || !(0.0..=1.0).contains(&self.default_threshold) {
            errors.push(format!(
                "default_threshold must be between 0.0 and 1.0 (got {})",
                self.default_threshold
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SearchError::Settings(errors.join("; ")))
        }
    }

    /// Describe each field for settings editors.
    pub fn schema() -> Value {
        let defaults = Settings::default();
        json!({
            "title": "Declarative memory search settings",
            "type": "object",
            "properties": {
                "default_k": {
                    "title": "Default number of results",
                    "description": "Default number of results to return",
                    "type": "integer",
                    "default": defaults.default_k,
                    "minimum": DEFAULT_K_RANGE.0,
                    "maximum": DEFAULT_K_RANGE.1,
                },
                "default_threshold": {
                    "title": "Default similarity threshold",
                    "description": "Default similarity threshold for results",
                    "type": "number",
                    "default": defaults.default_threshold,
                    "minimum": 0.0,
                    "maximum": 1.0,
                },
                "max_k": {
                    "title": "Maximum number of results",
                    "description": "Maximum number of results that can be requested",
                    "type": "integer",
                    "default": defaults.max_k,
                    "minimum": MAX_K_RANGE.0,
                    "maximum": MAX_K_RANGE.1,
                },
                "enable_metadata_filter": {
                    "title": "Enable metadata filters",
                    "description": "Allow filtering results by metadata",
                    "type": "boolean",
                    "default": defaults.enable_metadata_filter,
                },
                "enable_content_preview": {
                    "title": "Enable content preview",
                    "description": "Include content preview in results",
                    "type": "boolean",
                    "default": defaults.enable_content_preview,
                },
                "preview_length": {
                    "title": "Preview length",
                    "description": "Number of characters for content preview",
                    "type": "integer",
                    "default": defaults.preview_length,
                    "minimum": PREVIEW_LENGTH_RANGE.0,
                    "maximum": PREVIEW_LENGTH_RANGE.1,
                },
                "use_search_method": {
                    "title": "Use native search methods",
                    "description": "Try the collection's search methods before recall by embedding",
                    "type": "boolean",
                    "default": defaults.use_search_method,
                },
            }
        })
    }
}

fn check_range(errors: &mut Vec<String>, field: &str, value: usize, (min, max): (usize, usize)) {
    if value < min || value > max {
        errors.push(format!(
            "{} must be between {} and {} (got {})",
            field, min, max, value
        ));
    }
}

/// Parameters a search actually runs with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveParams {
    pub k: usize,
    pub threshold: f64,
}

/// Merge request overrides with settings defaults.
///
/// Fails when the effective `k` exceeds `max_k`.
pub fn resolve(request: &SearchRequest, settings: &Settings) -> Result<EffectiveParams> {
    let k = request.k.unwrap_or(settings.default_k);
    let threshold = request.threshold.unwrap_or(settings.default_threshold);

    if k > settings.max_k {
        return Err(SearchError::validation(format!(
            "Requested number of results ({}) exceeds maximum allowed ({})",
            k, settings.max_k
        )));
    }

    Ok(EffectiveParams { k, threshold })
}
