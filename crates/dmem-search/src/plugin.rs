//! The declarative memory plugin.

use crate::error::SearchError;
use crate::request::SearchRequest;
use crate::response::SearchResponse;
use crate::service::{SearchService, SERVICE_VERSION};
use crate::settings::Settings;
use crate::Result;
use async_trait::async_trait;
use dmem_plugin_sdk::{
    Plugin, PluginCapability, PluginContext, PluginError, PluginHealth, PluginMetadata,
    PluginState, SettingsStore, Version,
};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Plugin name, also the key its settings are stored under.
pub const PLUGIN_NAME: &str = "declarative-memory";

/// Exposes [`SearchService`] to the host and manages its settings.
pub struct DeclarativeMemoryPlugin {
    service: Arc<SearchService>,
    store: Option<Arc<dyn SettingsStore>>,
    state: PluginState,
}

impl DeclarativeMemoryPlugin {
    /// Wrap a service. Settings are unavailable until [`Plugin::initialize`].
    pub fn new(service: Arc<SearchService>) -> Self {
        Self {
            service,
            store: None,
            state: PluginState::Loaded,
        }
    }

    /// The search service.
    pub fn service(&self) -> &Arc<SearchService> {
        &self.service
    }

    fn store(&self) -> Result<&Arc<dyn SettingsStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| PluginError::NotInitialized(PLUGIN_NAME.to_string()).into())
    }

    /// Current settings from the host store.
    pub async fn settings(&self) -> Result<Settings> {
        let value = self.store()?.load(PLUGIN_NAME).await?;
        Settings::from_value(value)
    }

    /// Validate and persist a settings document. Missing keys take defaults.
    pub async fn save_settings(&self, value: Value) -> Result<Settings> {
        let settings = Settings::from_value(value)?;
        self.write(&settings).await?;
        Ok(settings)
    }

    /// Set one settings key, keeping the others.
    pub async fn set_setting(&self, key: &str, value: Value) -> Result<Settings> {
        let settings = self.settings().await?.with_value(key, value)?;
        self.write(&settings).await?;
        Ok(settings)
    }

    /// Restore default settings.
    pub async fn reset_settings(&self) -> Result<Settings> {
        let settings = Settings::default();
        self.write(&settings).await?;
        Ok(settings)
    }

    async fn write(&self, settings: &Settings) -> Result<()> {
        let value =
            serde_json::to_value(settings).map_err(|e| SearchError::Settings(e.to_string()))?;
        self.store()?.save(PLUGIN_NAME, value).await?;
        info!("Saved {} settings", PLUGIN_NAME);
        Ok(())
    }

    /// Search with the settings current at call time.
    ///
    /// The reported search time includes loading the settings.
    pub async fn search(&self, request: &SearchRequest, caller: &str) -> Result<SearchResponse> {
        let started = Instant::now();
        let settings = self.settings().await.map_err(|e| {
            error!("Could not load settings for search by user {}: {}", caller, e);
            e
        })?;
        self.service
            .search_since(request, &settings, caller, started)
            .await
    }
}

#[async_trait]
impl Plugin for DeclarativeMemoryPlugin {
    fn metadata(&self) -> PluginMetadata {
        let version = Version::parse(SERVICE_VERSION).unwrap_or_else(|_| Version::new(0, 0, 0));
        PluginMetadata::new(
            PLUGIN_NAME,
            version,
            "Search declarative memory over HTTP with metadata filters and previews",
        )
        .with_capability(PluginCapability::MemorySearch)
        .with_capability(PluginCapability::Endpoints)
        .with_capability(PluginCapability::Settings)
    }

    async fn initialize(&mut self, ctx: &PluginContext) -> dmem_plugin_sdk::Result<()> {
        self.state = PluginState::Initializing;

        let metadata = self.metadata();
        if !metadata.is_compatible_with(&ctx.host_version) {
            self.state = PluginState::Error;
            return Err(PluginError::initialization(format!(
                "{} requires host {} or newer",
                PLUGIN_NAME,
                metadata.min_host_version.map(|v| v.to_string()).unwrap_or_default()
            )));
        }

        // Stored settings must be usable before the first request.
        let stored = ctx.settings.load(PLUGIN_NAME).await?;
        if let Err(e) = Settings::from_value(stored) {
            self.state = PluginState::Error;
            return Err(PluginError::settings(e.to_string()));
        }

        self.store = Some(ctx.settings.clone());
        self.state = PluginState::Ready;
        info!("Plugin {} initialized", PLUGIN_NAME);
        Ok(())
    }

    async fn shutdown(&mut self) -> dmem_plugin_sdk::Result<()> {
        self.state = PluginState::Stopped;
        Ok(())
    }

    fn state(&self) -> PluginState {
        self.state
    }

    async fn health_check(&self) -> dmem_plugin_sdk::Result<PluginHealth> {
        match self.service.bound() {
            Ok(bound) => Ok(PluginHealth::healthy()
                .with_metric("strategies", serde_json::json!(bound.plan().len()))),
            Err(e) => Ok(PluginHealth::unhealthy(e.to_string())),
        }
    }

    fn settings_schema(&self) -> Option<Value> {
        Some(Settings::schema())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
