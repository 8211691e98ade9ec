//! Configuration schema definitions.

use crate::types::{Capability, MemoryArea};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main dmem configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Embedder used for query embeddings.
    #[serde(default)]
    pub embedder: EmbedderConfig,

    /// Memory collections per area.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Plugin settings store.
    #[serde(default)]
    pub settings: SettingsStoreConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind mode.
    #[serde(default)]
    pub bind: BindMode,

    /// Port number.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable the CORS layer.
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::default(),
            port: default_port(),
            cors: true,
        }
    }
}

fn default_port() -> u16 {
    1865
}

/// Network bind mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// 127.0.0.1 only.
    #[default]
    Loopback,
    /// All interfaces.
    Lan,
}

/// Embedder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    /// Embedding provider.
    #[serde(default)]
    pub provider: EmbedderProvider,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Declared vector size. Derived from the model when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedderProvider::default(),
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            api_key_env: default_api_key_env(),
            dimension: None,
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Embedding provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderProvider {
    /// OpenAI or any OpenAI-compatible `/v1/embeddings` endpoint.
    #[default]
    Openai,
}

/// Memory collections, one optional collection per area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Declarative (long-term factual) memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declarative: Option<CollectionConfig>,

    /// Episodic (conversation) memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodic: Option<CollectionConfig>,

    /// Procedural (tools and procedures) memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedural: Option<CollectionConfig>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            declarative: Some(CollectionConfig::local(MemoryArea::Declarative.as_str())),
            episodic: None,
            procedural: None,
        }
    }
}

impl MemoryConfig {
    /// Get the collection configured for an area.
    pub fn area(&self, area: MemoryArea) -> Option<&CollectionConfig> {
        match area {
            MemoryArea::Declarative => self.declarative.as_ref(),
            MemoryArea::Episodic => self.episodic.as_ref(),
            MemoryArea::Procedural => self.procedural.as_ref(),
        }
    }
}

/// A single collection binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name reported to clients.
    pub name: String,

    /// Backend serving the collection.
    #[serde(flatten)]
    pub backend: CollectionBackend,
}

impl CollectionConfig {
    /// A process-local collection with every capability enabled.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: CollectionBackend::Local {
                seed: None,
                capabilities: Capability::all().to_vec(),
            },
        }
    }
}

/// Collection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum CollectionBackend {
    /// In-process collection, optionally seeded from a JSON file.
    Local {
        /// Seed file of `{content, metadata}` records.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<PathBuf>,

        /// Capabilities the collection exposes.
        #[serde(default = "all_capabilities")]
        capabilities: Vec<Capability>,
    },

    /// Host-provided collection reached over HTTP.
    Remote {
        /// Base URL of the collection API.
        url: String,

        /// Capabilities the host declares.
        #[serde(default)]
        capabilities: Vec<Capability>,
    },
}

impl CollectionBackend {
    /// Declared capabilities.
    pub fn capabilities(&self) -> &[Capability] {
        match self {
            Self::Local { capabilities, .. } | Self::Remote { capabilities, .. } => capabilities,
        }
    }
}

fn all_capabilities() -> Vec<Capability> {
    Capability::all().to_vec()
}

/// Plugin settings store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsStoreConfig {
    /// Settings file. Defaults to `~/.dmem/settings.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Keep settings in memory only.
    #[serde(default)]
    pub ephemeral: bool,
}

fn default_true() -> bool {
    true
}
