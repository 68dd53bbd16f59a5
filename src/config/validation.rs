use crate::config::types::{ApiConfig, BudgetConfig, Config, InputConfig, OutputConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_input_config(&config.input)?;
    validate_api_config(&config.api)?;
    validate_search_config(&config.search)?;
    validate_budget_config(&config.budget)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.queries_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "queries_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates API connection settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.page_size < 1 || config.page_size > 50 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 50, got {}",
            config.page_size
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the date range
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if let (Some(after), Some(before)) = (config.published_after, config.published_before) {
        if after > before {
            return Err(ConfigError::Validation(format!(
                "published_after ({}) must not be later than published_before ({})",
                after, before
            )));
        }
    }
    Ok(())
}

/// Validates run budgets
fn validate_budget_config(config: &BudgetConfig) -> Result<(), ConfigError> {
    if config.per_query_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "per_query_cap must be >= 1, got {}",
            config.per_query_cap
        )));
    }

    if config.max_total < 1 {
        return Err(ConfigError::Validation(format!(
            "max_total must be >= 1, got {}",
            config.max_total
        )));
    }

    if config.checkpoint_every < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_every must be >= 1, got {}",
            config.checkpoint_every
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.rows_path.is_empty() {
        return Err(ConfigError::Validation(
            "rows_path cannot be empty".to_string(),
        ));
    }

    if config.counts_path.is_empty() {
        return Err(ConfigError::Validation(
            "counts_path cannot be empty".to_string(),
        ));
    }

    if config.rows_path == config.counts_path {
        return Err(ConfigError::Validation(format!(
            "rows_path and counts_path must differ, both are '{}'",
            config.rows_path
        )));
    }

    if matches!(&config.summary_path, Some(p) if p.is_empty()) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
