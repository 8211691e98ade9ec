//! CLI routing integration tests.
//!
//! These run parsed command lines through `dmem_cli::run` against
//! temporary config and settings files. None of them need an embedder.

use clap::Parser;
use dmem_cli::{run, Cli};
use dmem_core::config::Config;
use dmem_plugin_sdk::{FileSettingsStore, SettingsStore};
use dmem_search::PLUGIN_NAME;
use std::path::Path;
use tempfile::TempDir;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("dmem").chain(args.iter().copied()))
        .expect("arguments parse")
}

/// Write a config whose settings live next to it.
fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("dmem.json5");
    let mut config = Config::default();
    config.settings.path = Some(dir.join("settings.json"));
    config.save(&path).unwrap();
    path
}

#[tokio::test]
async fn test_version() {
    assert!(run(cli(&["version"])).await.is_ok());
}

#[tokio::test]
async fn test_config_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dmem.json5");
    let path_arg = path.to_str().unwrap();

    run(cli(&["-c", path_arg, "config", "init"])).await.unwrap();
    assert!(Config::load(&path).is_ok());

    assert!(run(cli(&["-c", path_arg, "config", "init"])).await.is_err());
    run(cli(&["-c", path_arg, "config", "init", "--force"]))
        .await
        .unwrap();
    run(cli(&["-c", path_arg, "config", "validate"])).await.unwrap();
    run(cli(&["-c", path_arg, "config", "show"])).await.unwrap();
}

#[tokio::test]
async fn test_config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dmem.json5");
    std::fs::write(&path, "{ server: { port: 0 } }").unwrap();

    let err = run(cli(&["-c", path.to_str().unwrap(), "config", "validate"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("port cannot be 0"));
}

#[tokio::test]
async fn test_settings_set_and_reset() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path());
    let path_arg = path.to_str().unwrap();
    let store = FileSettingsStore::new(dir.path().join("settings.json"));

    run(cli(&["-c", path_arg, "settings", "set", "max_k", "40"]))
        .await
        .unwrap();
    assert_eq!(store.load(PLUGIN_NAME).await.unwrap()["max_k"], 40);

    assert!(run(cli(&["-c", path_arg, "settings", "set", "max_k", "500"]))
        .await
        .is_err());
    assert_eq!(store.load(PLUGIN_NAME).await.unwrap()["max_k"], 40);

    run(cli(&["-c", path_arg, "settings", "reset"])).await.unwrap();
    assert_eq!(store.load(PLUGIN_NAME).await.unwrap()["max_k"], 20);

    run(cli(&["-c", path_arg, "settings", "show"])).await.unwrap();
    run(cli(&["-c", path_arg, "settings", "schema"])).await.unwrap();
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["dmem", "gateway", "run"]).is_err());
}
