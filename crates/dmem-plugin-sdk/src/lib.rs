//! dmem Plugin SDK
//!
//! This crate provides the traits and types shared between the dmem host and
//! its plugins:
//! - The [`Plugin`] lifecycle trait and its metadata
//! - Plugin health reporting
//! - The host [`SettingsStore`] that persists each plugin's settings
//!
//! # Example Plugin
//!
//! ```rust,ignore
//! use dmem_plugin_sdk::prelude::*;
//!
//! pub struct MyPlugin;
//!
//! #[async_trait]
//! impl Plugin for MyPlugin {
//!     fn metadata(&self) -> PluginMetadata {
//!         PluginMetadata::new("my-plugin", Version::new(0, 1, 0), "My plugin")
//!     }
//!
//!     async fn initialize(&mut self, ctx: &PluginContext) -> Result<()> {
//!         let settings = ctx.settings.load("my-plugin").await?;
//!         Ok(())
//!     }
//!
//!     async fn shutdown(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//! }
//! ```

mod error;
mod settings;

pub use error::{PluginError, Result};
pub use settings::{FileSettingsStore, InMemorySettingsStore, SettingsStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Semantic version type.
pub use semver::Version;

/// Plugin metadata describing the plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Plugin name (unique identifier).
    pub name: String,

    /// Plugin version.
    pub version: Version,

    /// Plugin description.
    pub description: String,

    /// Plugin author.
    pub author: Option<String>,

    /// Plugin capabilities.
    pub capabilities: Vec<PluginCapability>,

    /// Minimum required host version.
    #[serde(default)]
    pub min_host_version: Option<Version>,
}

impl PluginMetadata {
    /// Metadata with no author, capabilities or version floor.
    pub fn new(name: impl Into<String>, version: Version, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            description: description.into(),
            author: None,
            capabilities: Vec::new(),
            min_host_version: None,
        }
    }

    /// Add a capability.
    pub fn with_capability(mut self, capability: PluginCapability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Whether the plugin can run on the given host version.
    pub fn is_compatible_with(&self, host: &Version) -> bool {
        self.min_host_version.as_ref().map_or(true, |min| host >= min)
    }
}

/// Plugin capability types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginCapability {
    /// Plugin searches host memory.
    MemorySearch,
    /// Plugin serves HTTP endpoints.
    Endpoints,
    /// Plugin publishes a settings schema.
    Settings,
}

/// Plugin state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Plugin is loaded but not initialized.
    Loaded,
    /// Plugin is initializing.
    Initializing,
    /// Plugin is ready and running.
    Ready,
    /// Plugin has been stopped.
    Stopped,
    /// Plugin encountered an error.
    Error,
}

/// What the host hands a plugin when initializing it.
pub struct PluginContext {
    /// Host version.
    pub host_version: Version,

    /// Host settings store.
    pub settings: Arc<dyn SettingsStore>,
}

impl PluginContext {
    /// Create a new plugin context.
    pub fn new(host_version: Version, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            host_version,
            settings,
        }
    }
}

/// The main plugin trait that all plugins must implement.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Get the plugin metadata.
    fn metadata(&self) -> PluginMetadata;

    /// Initialize the plugin.
    async fn initialize(&mut self, ctx: &PluginContext) -> Result<()>;

    /// Shutdown the plugin.
    async fn shutdown(&mut self) -> Result<()>;

    /// Get the current plugin state.
    fn state(&self) -> PluginState {
        PluginState::Ready
    }

    /// Check plugin health.
    async fn health_check(&self) -> Result<PluginHealth> {
        Ok(PluginHealth::healthy())
    }

    /// JSON description of the plugin's settings, if it has any.
    fn settings_schema(&self) -> Option<serde_json::Value> {
        None
    }

    /// Get the plugin as Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Plugin health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginHealth {
    /// Whether the plugin is healthy.
    pub healthy: bool,

    /// Optional health message.
    pub message: Option<String>,

    /// Last check timestamp.
    pub last_check: chrono::DateTime<chrono::Utc>,

    /// Additional health metrics.
    pub metrics: HashMap<String, serde_json::Value>,
}

impl PluginHealth {
    /// Create a healthy status.
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            message: None,
            last_check: chrono::Utc::now(),
            metrics: HashMap::new(),
        }
    }

    /// Create an unhealthy status.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            last_check: chrono::Utc::now(),
            metrics: HashMap::new(),
        }
    }

    /// Add a metric.
    pub fn with_metric(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::{
        FileSettingsStore, InMemorySettingsStore, Plugin, PluginCapability, PluginContext,
        PluginError, PluginHealth, PluginMetadata, PluginState, Result, SettingsStore, Version,
    };

    pub use async_trait::async_trait;
}
