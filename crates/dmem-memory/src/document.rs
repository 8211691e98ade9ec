//! Documents as handed over by a collection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Document metadata.
pub type Metadata = serde_json::Map<String, Value>;

/// A document whose exact shape is owned by the collection.
///
/// Most backends return `{"page_content": .., "metadata": {..}}`, but some
/// use `content` or hand back a bare string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

/// Errors reading a document's fields.
#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    /// `metadata` exists but is not an object.
    #[error("metadata must be an object, got {0}")]
    MalformedMetadata(&'static str),
}

impl Document {
    /// Create a document from content and metadata.
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self(serde_json::json!({
            "page_content": content.into(),
            "metadata": metadata,
        }))
    }

    /// Wrap an arbitrary value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// The underlying value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Document text: `page_content`, then `content`, then the string form.
    pub fn content(&self) -> String {
        for field in ["page_content", "content"] {
            if let Some(text) = self.0.get(field).and_then(Value::as_str) {
                return text.to_string();
            }
        }

        match &self.0 {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Document metadata, if the document carries any.
    pub fn metadata(&self) -> Result<Option<&Metadata>, DocumentError> {
        match self.0.get("metadata") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(DocumentError::MalformedMetadata(value_kind(other))),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
