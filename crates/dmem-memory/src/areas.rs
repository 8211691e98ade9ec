//! The set of collections, one per memory area.

use crate::collection::{Capabilities, MemoryCollection};
use crate::embeddings::Embedder;
use crate::local::LocalCollection;
use crate::remote::RemoteCollection;
use crate::Result;
use dmem_core::config::{CollectionBackend, CollectionConfig, MemoryConfig};
use dmem_core::MemoryArea;
use std::sync::Arc;
use tracing::info;

/// Collections by area. Areas without a collection are `None`.
#[derive(Clone, Default)]
pub struct MemoryAreas {
    pub declarative: Option<Arc<dyn MemoryCollection>>,
    pub episodic: Option<Arc<dyn MemoryCollection>>,
    pub procedural: Option<Arc<dyn MemoryCollection>>,
}

impl MemoryAreas {
    /// Only a declarative collection.
    pub fn declarative(collection: Arc<dyn MemoryCollection>) -> Self {
        Self {
            declarative: Some(collection),
            ..Self::default()
        }
    }

    /// Set the collection for an area.
    pub fn with(mut self, area: MemoryArea, collection: Arc<dyn MemoryCollection>) -> Self {
        match area {
            MemoryArea::Declarative => self.declarative = Some(collection),
            MemoryArea::Episodic => self.episodic = Some(collection),
            MemoryArea::Procedural => self.procedural = Some(collection),
        }
        self
    }

    /// Collection for an area.
    pub fn get(&self, area: MemoryArea) -> Option<&Arc<dyn MemoryCollection>> {
        match area {
            MemoryArea::Declarative => self.declarative.as_ref(),
            MemoryArea::Episodic => self.episodic.as_ref(),
            MemoryArea::Procedural => self.procedural.as_ref(),
        }
    }

    /// Build every configured collection, loading local seed files.
    pub async fn from_config(config: &MemoryConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let mut areas = Self::default();
        for area in MemoryArea::ALL {
            if let Some(collection) = config.area(area) {
                let built = build_collection(collection, embedder.clone()).await?;
                areas = areas.with(area, built);
            }
        }
        Ok(areas)
    }
}

async fn build_collection(
    config: &CollectionConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn MemoryCollection>> {
    match &config.backend {
        CollectionBackend::Local { seed, capabilities } => {
            let collection = LocalCollection::new(config.name.clone(), embedder)
                .with_capabilities(Capabilities::new(capabilities.iter().copied()));
            if let Some(seed) = seed {
                collection.load_seed(seed).await?;
            }
            info!("Bound local collection '{}'", config.name);
            Ok(Arc::new(collection))
        }
        CollectionBackend::Remote { url, capabilities } => {
            info!("Bound remote collection '{}' at {}", config.name, url);
            Ok(Arc::new(RemoteCollection::new(
                config.name.clone(),
                url.clone(),
                embedder,
                Capabilities::new(capabilities.iter().copied()),
            )))
        }
    }
}
