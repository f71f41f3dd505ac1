// src/error_recovery.rs
//! Retry with exponential backoff for provider lookups.

use crate::geocoding::CancelToken;
use rand::Rng;
use std::time::Duration;

/// How patiently a throttled request is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Total attempts, the first one included. Never less than 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random delay added on top of each backoff.
    pub jitter: Duration,
}

impl BackoffPolicy {
    /// Delay to wait before the given retry (1 for the first retry).
    ///
    /// Doubles per retry, capped at `max_delay`, without jitter.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        let factor = 1u32 << exponent;
        std::cmp::min(self.initial_delay.saturating_mul(factor), self.max_delay)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter.is_zero() {
            return delay;
        }
        let extra_ms = rand::rng().random_range(0..=self.jitter.as_millis() as u64);
        delay + Duration::from_millis(extra_ms)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
            jitter: Duration::from_millis(DEFAULT_JITTER_MS),
        }
    }
}

/// How a retried operation ended.
#[derive(Debug, PartialEq)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded, or failed with an error not worth retrying.
    Completed { result: Result<T, E>, attempts: u32 },
    /// Every attempt failed with a retryable error.
    Exhausted { last_error: E, attempts: u32 },
    /// Cancellation arrived while waiting between attempts.
    Cancelled { attempts: u32 },
}

/// Retries an async operation with exponential backoff while `is_retryable`
/// holds for its error.
///
/// Waits are raced against `cancel`; an attempt already in flight is always
/// allowed to finish.
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    mut operation: F,
    policy: &BackoffPolicy,
    is_retryable: R,
    cancel: &CancelToken,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation(attempt).await {
            Ok(value) => {
                return RetryOutcome::Completed {
                    result: Ok(value),
                    attempts: attempt,
                }
            }
            Err(e) if !is_retryable(&e) => {
                return RetryOutcome::Completed {
                    result: Err(e),
                    attempts: attempt,
                }
            }
            Err(e) => e,
        };

        if attempt >= max_attempts {
            return RetryOutcome::Exhausted {
                last_error: error,
                attempts: attempt,
            };
        }

        let delay = policy.jittered(policy.delay_before_retry(attempt));
        log::warn!(
            "Attempt {} failed ({}), retrying after {:?}",
            attempt,
            error,
            delay
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log::info!("Retry abandoned after {} attempts: run cancelled", attempt);
                return RetryOutcome::Cancelled { attempts: attempt };
            }
            () = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }
}
