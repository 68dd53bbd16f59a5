//! Configuration module for vidharvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and reading the query list.
//!
//! # Example
//!
//! ```no_run
//! use vidharvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Search calls allowed: {:?}", config.budget.max_search_calls);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, BudgetConfig, Config, InputConfig, OutputConfig, RetryConfig, SearchConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_queries, read_queries,
};
