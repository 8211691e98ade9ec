//! dmem command-line interface.

pub mod commands;
pub mod host;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dmem - declarative memory search service
#[derive(Parser)]
#[command(name = "dmem")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Path to config file
    #[arg(short, long, env = dmem_core::env::vars::DMEM_CONFIG, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(commands::serve::ServeArgs),

    /// Run a single search and print the response
    Search(commands::search::SearchArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Manage plugin settings
    Settings(commands::settings::SettingsArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, config_path).await,
        Commands::Search(args) => commands::search::run(args, config_path).await,
        Commands::Config(args) => commands::config::run(args, config_path).await,
        Commands::Settings(args) => commands::settings::run(args, config_path).await,
        Commands::Version => {
            println!(
                "dmem {} ({})",
                env!("CARGO_PKG_VERSION"),
                dmem_search::PLUGIN_NAME
            );
            Ok(())
        }
    }
}
