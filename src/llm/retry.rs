//! Exponential backoff for transient generation failures
//!
//! [`BackoffPolicy`] is independent of the transport: callers supply the
//! operation and a predicate deciding which errors are worth retrying.

use crate::types::{AppError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry budget and delay schedule for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

impl BackoffPolicy {
    /// `max_attempts` counts the first attempt and is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay after the failed attempt with 0-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent.
    ///
    /// A retryable failure on the final attempt yields
    /// [`AppError::RetryExhausted`]; no delay follows the final attempt.
    pub async fn retry<T, F, Fut, P>(&self, is_retryable: P, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&AppError) -> bool,
    {
        for attempt in 0..self.max_attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) => {
                    if attempt + 1 == self.max_attempts {
                        warn!(attempts = self.max_attempts, error = %e, "Retry budget exhausted");
                        break;
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retryable failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::RetryExhausted {
            attempts: self.max_attempts,
        })
    }
}
