//! HTTP gateway server.

use crate::error::GatewayError;
use crate::routes::{routes, AppState};
use crate::Result;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use dmem_core::config::{BindMode, ServerConfig};
use dmem_search::DeclarativeMemoryPlugin;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 1865;

/// Origins allowed by CORS.
const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost",
    "http://127.0.0.1",
    "https://localhost",
    "https://127.0.0.1",
];

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind mode.
    pub bind: BindMode,

    /// Port number.
    pub port: u16,

    /// Enable CORS.
    pub cors: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::Loopback,
            port: DEFAULT_PORT,
            cors: true,
        }
    }
}

impl From<&ServerConfig> for GatewayConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            bind: config.bind,
            port: config.port,
            cors: config.cors,
        }
    }
}

/// The HTTP gateway serving the declarative memory plugin.
pub struct Gateway {
    config: GatewayConfig,
    state: Arc<AppState>,
}

impl Gateway {
    /// Create a gateway for an initialized plugin.
    pub fn new(config: GatewayConfig, plugin: Arc<DeclarativeMemoryPlugin>) -> Self {
        Self {
            config,
            state: Arc::new(AppState { plugin }),
        }
    }

    /// Run the gateway server until it fails.
    pub async fn run(&self) -> Result<()> {
        let addr = self.bind_address();

        if self.config.bind != BindMode::Loopback {
            warn!("Gateway binding to {}; the API is reachable from the network", addr);
        }

        let app = self.router();

        info!("Starting gateway server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(GatewayError::Io)?;

        axum::serve(listener, app).await.map_err(GatewayError::Io)?;

        Ok(())
    }

    /// Build the router with its layers.
    pub fn router(&self) -> Router {
        let mut router = routes(self.state.clone()).layer(TraceLayer::new_for_http());

        if self.config.cors {
            router = router.layer(Self::create_cors_layer());
        }

        router
    }

    fn create_cors_layer() -> CorsLayer {
        let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([
                HeaderName::from_static("content-type"),
                HeaderName::from_static(crate::caller::CALLER_HEADER),
            ])
            .max_age(std::time::Duration::from_secs(3600))
    }

    /// The address the server listens on.
    pub fn bind_address(&self) -> SocketAddr {
        let ip = match self.config.bind {
            BindMode::Loopback => [127, 0, 0, 1],
            BindMode::Lan => [0, 0, 0, 0],
        };

        SocketAddr::from((ip, self.config.port))
    }
}
