//! Plugin settings commands.
//!
//! These edit the settings store directly, so they work without an
//! embedder or a running server.

use crate::commands::parse_value;
use crate::host;
use clap::Args;
use dmem_plugin_sdk::SettingsStore;
use dmem_search::{Settings, PLUGIN_NAME};
use std::path::Path;

/// Settings command arguments.
#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(clap::Subcommand)]
pub enum SettingsCommand {
    /// Show the current settings
    Show,

    /// Set one setting
    Set {
        /// Setting name
        key: String,

        /// New value
        value: String,
    },

    /// Restore default settings
    Reset,

    /// Show the settings schema
    Schema,
}

/// Run the settings command.
pub async fn run(args: SettingsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = host::load_config(config_path)?;
    let store = host::settings_store(&config)?;

    let output = match args.command {
        SettingsCommand::Show => serde_json::to_value(current(store.as_ref()).await?)?,
        SettingsCommand::Set { key, value } => {
            let settings = set(store.as_ref(), &key, &value).await?;
            serde_json::to_value(settings)?
        }
        SettingsCommand::Reset => serde_json::to_value(reset(store.as_ref()).await?)?,
        SettingsCommand::Schema => Settings::schema(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Load and validate the stored settings.
pub async fn current(store: &dyn SettingsStore) -> anyhow::Result<Settings> {
    Ok(Settings::from_value(store.load(PLUGIN_NAME).await?)?)
}

/// Replace one setting, persisting only a valid result.
pub async fn set(store: &dyn SettingsStore, key: &str, raw: &str) -> anyhow::Result<Settings> {
    let settings = current(store).await?.with_value(key, parse_value(raw))?;
    store
        .save(PLUGIN_NAME, serde_json::to_value(&settings)?)
        .await?;
    Ok(settings)
}

/// Persist the default settings.
pub async fn reset(store: &dyn SettingsStore) -> anyhow::Result<Settings> {
    let settings = Settings::default();
    store
        .save(PLUGIN_NAME, serde_json::to_value(&settings)?)
        .await?;
    Ok(settings)
}
