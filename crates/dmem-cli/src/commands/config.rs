//! Configuration management commands.

use crate::host;
use clap::Args;
use dmem_core::config::Config;
use std::path::Path;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Validate the configuration file
    Validate,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = host::load_config(config_path)?;
            println!("{}", config.to_json5()?);
        }

        ConfigCommand::Validate => {
            let path = host::config_path(config_path)?;
            let config = Config::load(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
            println!("Configuration is valid: {}", path.display());
        }

        ConfigCommand::Init { force } => {
            let path = init(config_path, force)?;
            println!("Created config file: {}", path.display());
        }

        ConfigCommand::Path => {
            println!("{}", host::config_path(config_path)?.display());
        }
    }

    Ok(())
}

/// Write the default config, refusing to replace a file unless forced.
pub fn init(config_path: Option<&Path>, force: bool) -> anyhow::Result<std::path::PathBuf> {
    let path = host::config_path(config_path)?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save(&path)?;
    Ok(path)
}
