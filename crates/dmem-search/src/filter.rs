//! Post-retrieval metadata filtering.

use crate::settings::Settings;
use crate::strategy::SearchStrategy;
use dmem_memory::{Metadata, MetadataFilter, RawSearchResult};
use tracing::{debug, warn};

/// Whether results still need filtering after retrieval.
///
/// Not when there is no filter or an empty one, when filtering is
/// disabled, or when the strategy already filtered natively.
pub fn post_filter_required(
    filter: Option<&MetadataFilter>,
    settings: &Settings,
    strategy: SearchStrategy,
) -> bool {
    filter.is_some_and(|f| !f.is_empty())
        && settings.enable_metadata_filter
        && !strategy.applies_filter()
}

/// Keep the results whose metadata satisfies `filter`, in order.
///
/// Results with malformed metadata are logged and dropped.
pub fn apply(results: Vec<RawSearchResult>, filter: &MetadataFilter) -> Vec<RawSearchResult> {
    let before = results.len();
    let empty = Metadata::new();

    let kept: Vec<RawSearchResult> = results
        .into_iter()
        .filter(|raw| match raw.document().metadata() {
            Ok(metadata) => filter.matches(metadata.unwrap_or(&empty)),
            Err(e) => {
                warn!("Dropping result during metadata filtering: {}", e);
                false
            }
        })
        .collect();

    debug!("Metadata filter kept {} of {} results", kept.len(), before);
    kept
}
