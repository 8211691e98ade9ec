//! dmem CLI entry point.

use clap::Parser;
use dmem_cli::{run, Cli, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(cli.verbose)));
    let json = cli.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();

    run(cli).await
}

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "dmem=info",
        1 => "dmem=debug,tower_http=debug",
        _ => "dmem=trace,tower_http=trace",
    }
}
