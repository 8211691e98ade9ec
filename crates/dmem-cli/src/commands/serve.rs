//! Serve command.

use crate::host;
use clap::Args;
use dmem_core::config::BindMode;
use dmem_gateway::{Gateway, GatewayConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Serve command arguments.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind mode (loopback, lan)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Port number
    #[arg(short, long, env = dmem_core::env::vars::DMEM_PORT)]
    pub port: Option<u16>,
}

/// Parse a bind mode name.
pub fn parse_bind(bind: &str) -> anyhow::Result<BindMode> {
    match bind {
        "loopback" => Ok(BindMode::Loopback),
        "lan" => Ok(BindMode::Lan),
        _ => anyhow::bail!("Invalid bind mode: {}", bind),
    }
}

/// Run the serve command.
pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = host::load_config(config_path)?;

    if let Some(bind) = args.bind {
        config.server.bind = parse_bind(&bind)?;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let plugin = host::build_plugin(&config).await?;
    let gateway = Gateway::new(GatewayConfig::from(&config.server), Arc::new(plugin));

    info!(
        "Serving {} on http://{}{}",
        dmem_search::PLUGIN_NAME,
        gateway.bind_address(),
        dmem_gateway::PREFIX
    );
    gateway.run().await?;

    Ok(())
}
