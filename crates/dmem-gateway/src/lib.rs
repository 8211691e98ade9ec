//! HTTP gateway for the declarative memory plugin.
//!
//! Mounts the plugin's endpoints under `/declarative-memory`:
//! - `GET|POST /search` runs a search
//! - `GET /stats`, `GET /collections` and `GET /health` report on the backend
//! - `GET|PUT /settings` reads and replaces the plugin settings

pub mod caller;
pub mod error;
pub mod routes;
pub mod server;

pub use caller::Caller;
pub use error::GatewayError;
pub use routes::{routes, AppState, PREFIX};
pub use server::{Gateway, GatewayConfig};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
