//! Gateway error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dmem_search::SearchError;
use serde_json::json;
use thiserror::Error;

/// Generic message for failed searches.
pub const SEARCH_FAILED: &str = "Error during search";

/// Generic message for failed statistics.
pub const STATS_FAILED: &str = "Error retrieving statistics";

/// Generic message for failed information requests.
pub const INFO_FAILED: &str = "Error retrieving information";

/// Generic message for settings that could not be stored.
pub const SETTINGS_FAILED: &str = "Error saving settings";

/// Errors that can occur in the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request was well formed but its values are out of bounds.
    #[error("{0}")]
    Validation(String),

    /// The request body or query string could not be parsed.
    #[error("{0}")]
    BadRequest(String),

    /// Anything else. Only the generic message reaches the caller.
    #[error("{0}")]
    Internal(&'static str),
}

impl GatewayError {
    /// Map a search error, hiding everything but validation messages.
    pub fn from_search(err: SearchError, generic: &'static str) -> Self {
        match err {
            SearchError::Validation(message) => Self::Validation(message),
            _ => Self::Internal(generic),
        }
    }

    /// HTTP status for the error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => "validation_error",
            Self::Io(_) | Self::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Io(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = json!({
            "error_code": self.error_code(),
            "message": self.public_message(),
        });
        (self.status(), Json(body)).into_response()
    }
}
