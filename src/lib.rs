//! vidharvest: a quota-bounded video metadata harvester
//!
//! This crate walks a paginated video search API across many queries and time
//! windows, enriches the unique results with full metadata, and checkpoints the
//! accumulated rows so an interrupted run never loses work.

pub mod api;
pub mod config;
pub mod harvest;
pub mod output;
pub mod record;
pub mod state;
pub mod window;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{operation} failed after {attempts} attempts: {source}")]
    Fatal {
        operation: &'static str,
        attempts: u32,
        source: api::ApiError,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid run transition: {from} -> {to}")]
    InvalidTransition {
        from: state::RunPhase,
        to: state::RunPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run aborted after {} rows: {source}", .report.rows_written)]
    Aborted {
        report: Box<harvest::RunReport>,
        source: Box<HarvestError>,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing API key: set YOUTUBE_API_KEY, pass --api-key, or add api-key to [api]")]
    MissingApiKey,
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Harvester, RunReport};
pub use record::VideoRecord;
pub use state::{RunPhase, RunState};
pub use window::Window;
