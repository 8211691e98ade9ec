//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be written to disk, loaded back,
//! and turned into live collections.

use dmem_core::config::{CollectionBackend, CollectionConfig, Config};
use dmem_core::{Capability, MemoryArea};
use dmem_integration_tests::KeywordEmbedder;
use dmem_memory::{MemoryAreas, MemoryCollection};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dmem.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, config.server.port);
    assert_eq!(loaded.server.bind, config.server.bind);
    assert_eq!(loaded.embedder.model, config.embedder.model);
    assert_eq!(
        loaded.memory.declarative.unwrap().backend,
        config.memory.declarative.unwrap().backend
    );
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dmem.json5");

    let mut config = Config::default();
    config.server.port = 9090;
    config.memory.episodic = Some(CollectionConfig {
        name: "episodic".to_string(),
        backend: CollectionBackend::Remote {
            url: "http://127.0.0.1:1865/memory/episodic".to_string(),
            capabilities: vec![Capability::Search],
        },
    });
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, 9090);
    assert_eq!(
        loaded.memory.area(MemoryArea::Episodic).unwrap().backend.capabilities(),
        &[Capability::Search]
    );
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/dmem.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json5");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_seeded_local_collection_from_config() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.json");
    std::fs::write(
        &seed,
        r#"[
            {"id": "doc-1", "content": "Rust lifetimes", "metadata": {"source": "book"}},
            {"content": "Cooking pasta"}
        ]"#,
    )
    .unwrap();

    let config = Config::parse(&format!(
        r#"{{
            memory: {{
                declarative: {{
                    name: "facts",
                    backend: "local",
                    seed: {:?},
                    capabilities: ["search", "count"],
                }},
            }},
        }}"#,
        seed.display().to_string()
    ))
    .unwrap();

    let areas = MemoryAreas::from_config(&config.memory, Arc::new(KeywordEmbedder))
        .await
        .unwrap();
    let declarative = areas.get(MemoryArea::Declarative).unwrap();

    assert_eq!(declarative.info().collection_name, "facts");
    assert_eq!(declarative.count().await.unwrap(), 2);
    assert!(areas.get(MemoryArea::Episodic).is_none());
}
