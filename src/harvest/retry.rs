//! Retry with backoff for single remote calls
//!
//! Failures are classified by [`ApiError`]:
//!
//! | Failure | Delay before next attempt |
//! |---------|---------------------------|
//! | RateLimited (403/429) | `min(2^attempt s, cap)` |
//! | Transient (anything else) | `base * (attempt + 1)` |
//!
//! After `max_retries` guarded attempts one more attempt is made whose error
//! is not caught, so a call that never succeeds costs `max_retries + 1`
//! attempts.

use crate::api::ApiError;
use crate::config::RetryConfig;
use crate::HarvestError;
use std::future::Future;
use std::time::Duration;

/// Backoff parameters for the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Guarded attempts before the final unguarded one
    pub max_retries: u32,

    /// Ceiling for the exponential rate-limit backoff
    pub rate_limit_cap: Duration,

    /// Step of the linear backoff for other failures
    pub transient_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, rate_limit_cap: Duration, transient_base: Duration) -> Self {
        Self {
            max_retries,
            rate_limit_cap,
            transient_base,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_secs(config.rate_limit_cap_secs),
            Duration::from_millis(config.transient_base_ms),
        )
    }

    /// Delay after a failed guarded attempt (`attempt` counts from zero)
    pub fn delay_for(&self, error: &ApiError, attempt: u32) -> Duration {
        match error {
            ApiError::RateLimited { .. } => {
                Duration::from_secs(2u64.saturating_pow(attempt)).min(self.rate_limit_cap)
            }
            ApiError::Transient(_) => self.transient_base.saturating_mul(attempt + 1),
        }
    }

    /// Total attempts a call that never succeeds will make
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Runs `call` until it succeeds or the policy is exhausted
///
/// # Arguments
///
/// * `policy` - Backoff parameters
/// * `operation` - Name used in logs and in the fatal error
/// * `call` - Produces one attempt of the remote call
///
/// # Returns
///
/// * `Ok(T)` - The first successful result
/// * `Err(HarvestError::Fatal)` - The final unguarded attempt failed
pub async fn execute<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut call: F,
) -> Result<T, HarvestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    for attempt in 0..policy.max_retries {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let delay = policy.delay_for(&e, attempt);
                tracing::warn!(
                    "{} attempt {} failed ({}); retrying in {:?}",
                    operation,
                    attempt + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    call().await.map_err(|source| HarvestError::Fatal {
        operation,
        attempts: policy.max_attempts(),
        source,
    })
}
