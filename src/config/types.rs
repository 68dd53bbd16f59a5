use crate::api::SearchOrder;
use chrono::NaiveDate;
use serde::Deserialize;

/// Main configuration structure for a harvest run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    pub output: OutputConfig,
}

/// Where the query list comes from
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the query list, one query per line
    #[serde(rename = "queries-path")]
    pub queries_path: String,
}

/// Remote API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing endpoint name
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// API key; falls back to `YOUTUBE_API_KEY` or `--api-key`
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    /// Results requested per search page (the API allows at most 50)
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Delay between consecutive page fetches (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            page_size: default_page_size(),
            page_delay_ms: default_page_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Search ordering and time range
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub order: SearchOrder,

    /// Inclusive earliest publish date
    #[serde(rename = "published-after", default)]
    pub published_after: Option<NaiveDate>,

    /// Inclusive latest publish date
    #[serde(rename = "published-before", default)]
    pub published_before: Option<NaiveDate>,

    /// Split the date range into calendar-month windows
    #[serde(rename = "split-monthly", default)]
    pub split_monthly: bool,
}

/// Run-wide resource limits
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// Maximum ids collected per query per window
    #[serde(rename = "per-query-cap", default = "default_per_query_cap")]
    pub per_query_cap: u32,

    /// Maximum enriched videos across the whole run
    #[serde(rename = "max-total", default = "default_max_total")]
    pub max_total: u32,

    /// Maximum search calls across the whole run (100 quota units each)
    #[serde(rename = "max-search-calls", default = "default_max_search_calls")]
    pub max_search_calls: Option<u32>,

    /// Write partial output every N enriched videos
    #[serde(rename = "checkpoint-every", default = "default_checkpoint_every")]
    pub checkpoint_every: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            per_query_cap: default_per_query_cap(),
            max_total: default_max_total(),
            max_search_calls: default_max_search_calls(),
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

/// Backoff behaviour for failed remote calls
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Guarded attempts before the final unguarded one
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Ceiling for the exponential rate-limit backoff (seconds)
    #[serde(rename = "rate-limit-cap-secs", default = "default_rate_limit_cap_secs")]
    pub rate_limit_cap_secs: u64,

    /// Linear backoff step for other failures (milliseconds)
    #[serde(rename = "transient-base-ms", default = "default_transient_base_ms")]
    pub transient_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            rate_limit_cap_secs: default_rate_limit_cap_secs(),
            transient_base_ms: default_transient_base_ms(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the enriched row table
    #[serde(rename = "rows-path")]
    pub rows_path: String,

    /// Path to the per-query-per-window counts table
    #[serde(rename = "counts-path", default = "default_counts_path")]
    pub counts_path: String,

    /// Optional path for the markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_page_delay_ms() -> u64 {
    250
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_per_query_cap() -> u32 {
    100
}

fn default_max_total() -> u32 {
    2000
}

fn default_max_search_calls() -> Option<u32> {
    Some(80)
}

fn default_checkpoint_every() -> u32 {
    500
}

fn default_max_retries() -> u32 {
    5
}

fn default_rate_limit_cap_secs() -> u64 {
    16
}

fn default_transient_base_ms() -> u64 {
    1500
}

fn default_counts_path() -> String {
    "counts.csv".to_string()
}
