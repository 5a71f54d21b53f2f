//! Bounded retry with exponential backoff for transient failures.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Retry limits for page fetches and downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; zero disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
    /// capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Backoff plus up to 25% random jitter.
    fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let delay = self.backoff(attempt);
        let jitter_ms = (delay.as_millis() / 4) as u64;
        if jitter_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// Run `op` until it succeeds, fails permanently, or runs out of retries.
///
/// Only errors for which [`Error::is_retryable`] holds are retried. The
/// backoff sleep ends early with [`Error::Cancelled`] when `cancel` fires.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    what: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_with_jitter(attempt);
                tracing::warn!(
                    "{} failed: {}. Retry {}/{} in {:?}",
                    what,
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                }
            }
            Err(e) => return Err(e),
        }
    }
}
