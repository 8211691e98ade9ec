//! Configuration loading and persistence.

use super::{CollectionBackend, Config};
use crate::error::ConfigError;
use crate::paths;
use crate::types::MemoryArea;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load from `path` when given, else the default path, falling back to
    /// defaults when no file exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let result = match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        };

        match result {
            Err(ConfigError::NotFound(path)) => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to the default path.
    pub fn save_default(&self) -> Result<(), ConfigError> {
        let path = paths::config_file()?;
        self.save(&path)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        if self.embedder.model.trim().is_empty() {
            errors.push("Embedder model must not be empty".to_string());
        }
        if url::Url::parse(&self.embedder.base_url).is_err() {
            errors.push(format!(
                "Embedder base_url '{}' is not a valid URL",
                self.embedder.base_url
            ));
        }
        if self.embedder.dimension == Some(0) {
            errors.push("Embedder dimension must be greater than 0".to_string());
        }

        if self.memory.declarative.is_none() {
            errors.push("A declarative memory collection must be configured".to_string());
        }

        for area in MemoryArea::ALL {
            let Some(collection) = self.memory.area(area) else {
                continue;
            };

            if collection.name.trim().is_empty() {
                errors.push(format!("Memory '{}': collection name must not be empty", area));
            }

            if let CollectionBackend::Remote { url, .. } = &collection.backend {
                if url::Url::parse(url).is_err() {
                    errors.push(format!("Memory '{}': invalid remote url '{}'", area, url));
                }
            }

            let capabilities = collection.backend.capabilities();
            for (i, capability) in capabilities.iter().enumerate() {
                if capabilities[..i].contains(capability) {
                    errors.push(format!(
                        "Memory '{}': capability {:?} listed more than once",
                        area, capability
                    ));
                }
            }
        }

        if self.settings.ephemeral && self.settings.path.is_some() {
            errors.push("Settings store cannot be both ephemeral and file-backed".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
