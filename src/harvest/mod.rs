//! Harvest engine
//!
//! This module contains the core harvesting logic, including:
//! - Retry with backoff for single remote calls
//! - Paginated search for one query and window
//! - Batched metadata enrichment
//! - Budget enforcement
//! - Overall run orchestration with a guaranteed final checkpoint

mod budget;
mod driver;
mod enricher;
mod frontier;
mod retry;

#[cfg(test)]
mod fake;

pub use budget::{BudgetTracker, Decision};
pub use driver::{HarvestSettings, Harvester, RunReport, SEARCH_QUOTA_UNITS};
pub use enricher::MetadataEnricher;
pub use frontier::{FrontierWalker, WalkStop, WindowHarvest};
pub use retry::{execute, RetryPolicy};

use crate::api::YouTubeClient;
use crate::config::Config;
use crate::output::CsvCheckpointWriter;
use crate::window::{build_windows, Window};
use crate::HarvestError;

/// Builds a harvester that talks to the HTTP API and checkpoints to CSV
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `queries` - Queries in priority order
/// * `api_key` - Key sent with every request
///
/// # Returns
///
/// * `Ok(Harvester)` - Ready to run
/// * `Err(HarvestError)` - The HTTP client could not be built
pub fn harvester_from_config(
    config: &Config,
    queries: Vec<String>,
    api_key: &str,
) -> Result<Harvester<YouTubeClient, CsvCheckpointWriter>, HarvestError> {
    let client = YouTubeClient::new(&config.api, api_key)?;
    let sink = CsvCheckpointWriter::new(&config.output.rows_path, &config.output.counts_path);

    Ok(Harvester::new(
        client,
        sink,
        HarvestSettings::from_config(config),
        queries,
        windows_for(config),
    ))
}

/// The windows every query is searched over
pub fn windows_for(config: &Config) -> Vec<Window> {
    build_windows(
        config.search.published_after,
        config.search.published_before,
        config.search.split_monthly,
    )
}
