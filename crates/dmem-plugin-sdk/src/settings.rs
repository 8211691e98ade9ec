//! Host-side storage for plugin settings.

use crate::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// Where the host keeps each plugin's settings document.
///
/// A plugin that has never saved settings loads an empty object, and the
/// plugin fills in its own defaults.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the settings document for a plugin.
    async fn load(&self, plugin: &str) -> Result<Value>;

    /// Replace the settings document for a plugin.
    async fn save(&self, plugin: &str, settings: Value) -> Result<()>;
}

/// Settings kept in memory for the life of the process.
#[derive(Default)]
pub struct InMemorySettingsStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl InMemorySettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self, plugin: &str) -> Result<Value> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(plugin)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn save(&self, plugin: &str, settings: Value) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(plugin.to_string(), settings);
        Ok(())
    }
}

/// Settings persisted as one JSON object keyed by plugin name.
pub struct FileSettingsStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSettingsStore {
    /// Create a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content)? {
                Value::Object(map) => Ok(map),
                _ => Err(crate::PluginError::settings(format!(
                    "{} must contain a JSON object",
                    self.path.display()
                ))),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self, plugin: &str) -> Result<Value> {
        let _guard = self.lock.read().await;
        let mut all = self.read_all().await?;
        Ok(all
            .remove(plugin)
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn save(&self, plugin: &str, settings: Value) -> Result<()> {
        let _guard = self.lock.write().await;
        let mut all = self.read_all().await?;
        all.insert(plugin.to_string(), settings);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a sibling temp file, then rename over the target
        let content = serde_json::to_string_pretty(&Value::Object(all))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Saved settings for {} to {}", plugin, self.path.display());
        Ok(())
    }
}
