//! Wiring the plugin from configuration.

use dmem_core::config::Config;
use dmem_core::paths;
use dmem_memory::{Embedder, MemoryAreas, OpenAIEmbeddings};
use dmem_plugin_sdk::{
    FileSettingsStore, InMemorySettingsStore, Plugin, PluginContext, SettingsStore, Version,
};
use dmem_search::{DeclarativeMemoryPlugin, SearchService};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Load the config from `path` or the default location, falling back to
/// defaults when no file exists.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Ok(Config::load_or_default(path)?)
}

/// Path the config is read from and written to.
pub fn config_path(path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(paths::config_file()?),
    }
}

/// Open the settings store the config selects.
pub fn settings_store(config: &Config) -> anyhow::Result<Arc<dyn SettingsStore>> {
    if config.settings.ephemeral {
        return Ok(Arc::new(InMemorySettingsStore::new()));
    }

    let path = match &config.settings.path {
        Some(path) => path.clone(),
        None => paths::settings_file()?,
    };
    Ok(Arc::new(FileSettingsStore::new(path)))
}

/// Build the embedder, collections and plugin, then initialize the plugin
/// against the configured settings store.
pub async fn build_plugin(config: &Config) -> anyhow::Result<DeclarativeMemoryPlugin> {
    config.validate()?;

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbeddings::from_config(&config.embedder)?);
    info!(
        "Using embedder {} (model {})",
        embedder.name(),
        config.embedder.model
    );

    let areas = MemoryAreas::from_config(&config.memory, embedder.clone()).await?;
    let service = SearchService::new(areas, embedder);

    let ctx = PluginContext::new(
        Version::parse(env!("CARGO_PKG_VERSION"))?,
        settings_store(config)?,
    );

    let mut plugin = DeclarativeMemoryPlugin::new(Arc::new(service));
    plugin.initialize(&ctx).await?;
    Ok(plugin)
}
