//! One-shot search command.

use crate::commands::parse_value;
use crate::host;
use clap::Args;
use dmem_memory::MetadataFilter;
use dmem_search::SearchRequest;
use serde_json::Value;
use std::path::Path;

/// Caller recorded in logs for CLI searches.
const CLI_CALLER: &str = "cli";

/// Search command arguments.
#[derive(Args)]
pub struct SearchArgs {
    /// Text to search for
    pub query: String,

    /// Number of results
    #[arg(short)]
    pub k: Option<usize>,

    /// Minimum similarity score
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Metadata filter as key=value, repeatable
    #[arg(short, long, value_parser = parse_filter)]
    pub filter: Vec<(String, Value)>,

    /// Omit similarity scores from results
    #[arg(long)]
    pub no_scores: bool,

    /// Omit metadata from results
    #[arg(long)]
    pub no_metadata: bool,
}

impl SearchArgs {
    /// Build the request these arguments describe.
    pub fn to_request(&self) -> SearchRequest {
        let mut request = SearchRequest::new(self.query.clone());
        if let Some(k) = self.k {
            request = request.with_k(k);
        }
        if let Some(threshold) = self.threshold {
            request = request.with_threshold(threshold);
        }
        if !self.filter.is_empty() {
            request = request.with_filter(self.filter.iter().cloned().collect::<MetadataFilter>());
        }
        request.include_scores = !self.no_scores;
        request.include_metadata = !self.no_metadata;
        request
    }
}

/// Parse `key=value`, reading the value as JSON when possible.
pub fn parse_filter(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    Ok((key.to_string(), parse_value(value)))
}

/// Run the search command.
pub async fn run(args: SearchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = host::load_config(config_path)?;
    let plugin = host::build_plugin(&config).await?;

    let response = plugin.search(&args.to_request(), CLI_CALLER).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
