//! Retry-with-backoff for idempotent upstream calls (§7: `UNAVAILABLE` is
//! retried up to three times with exponential backoff before surfacing).
//!
//! Only read-only/idempotent port calls should be wrapped with
//! [`with_backoff`] — writes that might duplicate on an ambiguous failure
//! are never retried here (sync handles duplicates via identifier
//! equality instead, per §7).

use crate::error::AmemError;
use std::future::Future;
use std::time::Duration;

/// Tunables for one [`with_backoff`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Runs `op` up to `config.max_attempts` times, doubling the delay between
/// attempts (capped at `config.max_delay`), but only when the failure is
/// [`AmemError::Unavailable`] — every other error kind is surfaced
/// immediately since retrying a `NOT_FOUND` or `INVALID_ARGUMENT` can
/// never succeed.
pub async fn with_backoff<T, F, Fut>(config: BackoffConfig, mut op: F) -> Result<T, AmemError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AmemError>>,
{
    let attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut last_err = None;

    for attempt in 0..attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(AmemError::Unavailable(reason)) => {
                if attempt + 1 == attempts {
                    return Err(AmemError::Unavailable(reason));
                }
                tracing::warn!(attempt, reason = %reason, "upstream unavailable; retrying with backoff");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
                last_err = Some(AmemError::Unavailable(reason));
            }
            Err(other) => return Err(other),
        }
    }

    Err(last_err.unwrap_or_else(|| AmemError::Internal("retry loop exited without a result".into())))
}
