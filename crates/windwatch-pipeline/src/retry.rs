//! Retry of whole pipeline runs with exponential backoff.
//!
//! Only errors that report [`PipelineError::is_retryable`] are retried:
//! - transport timeouts and refused connections
//! - 5xx, 408 and 429 responses
//! - a busy or unreachable store
//!
//! Malformed data and rejected credentials fail immediately.

use std::future::Future;
use std::time::Duration;

use windwatch_core::ScheduleConfig;

use crate::error::PipelineError;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 2_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry (doubles each attempt)
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_MS)
    }
}

impl From<&ScheduleConfig> for RetryPolicy {
    fn from(schedule: &ScheduleConfig) -> Self {
        Self::new(
            schedule.max_retries,
            schedule.initial_delay_ms,
            schedule.max_delay_ms,
        )
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let initial_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(initial_ms.saturating_mul(factor).min(max_ms))
    }
}

/// Run `operation` until it succeeds, fails with a permanent error, or the
/// policy's retries are used up. The last error is returned.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Run succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => {
                tracing::debug!("Non-retryable {} error: {}", e.kind(), e);
                return Err(e);
            }
            Err(e) if attempt >= policy.max_retries => {
                tracing::error!("All {} attempts failed: {}", attempt + 1, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    "Attempt {} of {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    policy.max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
