//! vidharvest main entry point
//!
//! This is the command-line interface for the quota-bounded video metadata
//! harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vidharvest::config::{load_config_with_hash, read_queries, Config};
use vidharvest::harvest::{harvester_from_config, windows_for, RunReport, SEARCH_QUOTA_UNITS};
use vidharvest::output::{generate_run_summary, load_checkpoint_ids};
use vidharvest::{ConfigError, HarvestError, RunState};

/// vidharvest: a quota-bounded video metadata harvester
///
/// vidharvest searches a video API for every query and time window in the
/// configuration, enriches the unique results with full metadata, and
/// checkpoints them to CSV while staying inside the configured budgets.
#[derive(Parser, Debug)]
#[command(name = "vidharvest")]
#[command(version = "1.0.0")]
#[command(about = "A quota-bounded video metadata harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Query list to use instead of the one named in the configuration
    #[arg(long, value_name = "FILE")]
    queries: Option<PathBuf>,

    /// API key (overrides the configuration file)
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Skip every video already present in this row checkpoint
    #[arg(long, value_name = "ROWS_CSV")]
    seed_from: Option<PathBuf>,

    /// Validate config and show the work plan without calling the API
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    let queries_path = cli
        .queries
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.input.queries_path));
    let queries = read_queries(&queries_path)
        .with_context(|| format!("failed to read queries from {}", queries_path.display()))?;
    tracing::info!("Loaded {} queries", queries.len());

    if cli.dry_run {
        handle_dry_run(&config, &queries);
        return Ok(());
    }

    handle_harvest(&cli, config, queries, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vidharvest=info,warn"),
            1 => EnvFilter::new("vidharvest=debug,info"),
            2 => EnvFilter::new("vidharvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the queries, windows, and budgets
fn handle_dry_run(config: &Config, queries: &[String]) {
    let windows = windows_for(config);

    println!("=== vidharvest Dry Run ===\n");

    println!("Search:");
    println!("  Order: {}", config.search.order);
    println!("  Page size: {}", config.api.page_size);
    println!("  Page delay: {}ms", config.api.page_delay_ms);

    println!("\nBudgets:");
    println!("  Per query per window: {}", config.budget.per_query_cap);
    println!("  Max enriched videos: {}", config.budget.max_total);
    match config.budget.max_search_calls {
        Some(max) => println!(
            "  Max search calls: {} (~{} quota units)",
            max,
            u64::from(max) * SEARCH_QUOTA_UNITS
        ),
        None => println!("  Max search calls: unlimited"),
    }
    println!("  Checkpoint every: {}", config.budget.checkpoint_every);

    println!("\nOutput:");
    println!("  Rows: {}", config.output.rows_path);
    println!("  Counts: {}", config.output.counts_path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\nWindows ({}):", windows.len());
    for window in &windows {
        println!("  - {}", window);
    }

    println!("\nQueries ({}):", queries.len());
    for query in queries {
        println!("  - {}", query);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would search {} query/window pairs",
        queries.len() * windows.len()
    );
}

/// Handles the main harvest operation
async fn handle_harvest(
    cli: &Cli,
    config: Config,
    queries: Vec<String>,
    config_hash: &str,
) -> anyhow::Result<()> {
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| config.api.api_key.clone())
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    let state = match &cli.seed_from {
        Some(path) => {
            let ids = load_checkpoint_ids(path)
                .with_context(|| format!("failed to read seed ids from {}", path.display()))?;
            tracing::info!("Pre-seeded {} known ids from {}", ids.len(), path.display());
            RunState::with_seen(ids)
        }
        None => RunState::new(),
    };

    let harvester = harvester_from_config(&config, queries, &api_key)?;

    match harvester.run_with_state(state).await {
        Ok(report) => {
            write_summary(&config, &report, config_hash);
            tracing::info!("Harvest completed: {}", report.phase);
            Ok(())
        }
        Err(HarvestError::Aborted { report, source }) => {
            write_summary(&config, &report, config_hash);
            tracing::error!("Harvest failed: {}", source);
            Err(anyhow::Error::new(*source).context(format!(
                "harvest aborted after {} rows; partial output kept in {}",
                report.rows_written, config.output.rows_path
            )))
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Writes the markdown summary if a path is configured
fn write_summary(config: &Config, report: &RunReport, config_hash: &str) {
    let Some(path) = &config.output.summary_path else {
        return;
    };

    match generate_run_summary(report, config_hash, Path::new(path)) {
        Ok(()) => tracing::info!("Summary written to: {}", path),
        Err(e) => tracing::error!("Failed to write summary to {}: {}", path, e),
    }
}
