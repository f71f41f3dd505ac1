// src/geocoding/mod.rs
//! The batch geocoding loop.
//!
//! Addresses are processed one at a time, in input order. Every request
//! waits on the rate limiter, throttled replies are retried with backoff,
//! and each address yields exactly one `GeocodeResult`.

mod batch;
mod cancel;
mod progress;
mod rate_limiter;

pub use batch::{Batch, BatchRun, GeocodeResult, RunCompletion};
pub use cancel::{CancelToken, Cancelled};
pub use progress::{NoProgress, Progress, ProgressReporter};
pub use rate_limiter::RateLimiter;

use crate::constants::{API_KEY_ENV_VAR, DEFAULT_BURST, DEFAULT_REQUESTS_PER_SECOND};
use crate::error::{AppError, LookupError};
use crate::error_recovery::{retry_with_backoff, BackoffPolicy, RetryOutcome};
use crate::provider::GeocodingProvider;
use crate::types::{Address, ApiKey};

/// Everything a run needs besides the provider and the addresses.
#[derive(Debug, Clone)]
pub struct GeocoderSettings {
    /// Provider credential. A run without one fails before any request.
    pub api_key: Option<ApiKey>,
    pub backoff: BackoffPolicy,
    /// Sustained request rate allowed by the provider quota.
    pub requests_per_second: f64,
    /// Requests allowed back-to-back before pacing applies.
    pub burst: u32,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            backoff: BackoffPolicy::default(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            burst: DEFAULT_BURST,
        }
    }
}

/// Maps addresses to results through a provider.
pub struct GeocodingPipeline<P> {
    provider: P,
    settings: GeocoderSettings,
}

/// What processing one address produced.
enum AddressOutcome {
    Recorded(GeocodeResult),
    Abandoned,
}

impl<P: GeocodingProvider> GeocodingPipeline<P> {
    pub fn new(provider: P, settings: GeocoderSettings) -> Self {
        Self { provider, settings }
    }

    /// Geocodes every address in order.
    ///
    /// Fails only when no credential is configured, and then before any
    /// request is sent. Cancellation is checked between addresses and
    /// during waits; it yields the results recorded so far.
    pub async fn run(
        &self,
        addresses: &[Address],
        progress: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<BatchRun, AppError> {
        let key = self.settings.api_key.as_ref().ok_or_else(|| {
            AppError::MissingCredential(format!(
                "no geocoding API key configured (set {})",
                API_KEY_ENV_VAR
            ))
        })?;

        let total = addresses.len();
        let limiter = RateLimiter::new(self.settings.requests_per_second, self.settings.burst);
        let mut batch = Batch::with_capacity(total);

        log::info!("Geocoding {} addresses", total);

        for (position, address) in addresses.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(batch, total));
            }

            match self
                .geocode_address(position, address, key, &limiter, cancel)
                .await
            {
                AddressOutcome::Recorded(result) => {
                    log_result(&result);
                    batch.push(result);
                }
                AddressOutcome::Abandoned => return Ok(self.cancelled(batch, total)),
            }

            progress.report(&Progress {
                processed: position + 1,
                total,
                current: address,
            });
        }

        log::info!("Geocoding complete: {} results", batch.len());
        Ok(BatchRun {
            batch,
            completion: RunCompletion::Completed,
            requested: total,
        })
    }

    /// Resolves one address, retrying while the provider is throttling.
    async fn geocode_address(
        &self,
        position: usize,
        address: &Address,
        key: &ApiKey,
        limiter: &RateLimiter,
        cancel: &CancelToken,
    ) -> AddressOutcome {
        let outcome = retry_with_backoff(
            |attempt| async move {
                limiter
                    .acquire(cancel)
                    .await
                    .map_err(|_| PacedLookupError::Cancelled)?;
                if attempt > 1 {
                    log::info!("Retrying '{}' (attempt {})", address, attempt);
                }
                self.provider
                    .lookup(address, key)
                    .await
                    .map_err(PacedLookupError::Lookup)
            },
            &self.settings.backoff,
            PacedLookupError::is_retryable,
            cancel,
        )
        .await;

        match outcome {
            RetryOutcome::Completed {
                result: Ok(coordinate),
                attempts,
            } => AddressOutcome::Recorded(GeocodeResult::located(
                position,
                address.clone(),
                coordinate,
                attempts,
            )),
            RetryOutcome::Completed {
                result: Err(PacedLookupError::Lookup(error)),
                attempts,
            }
            | RetryOutcome::Exhausted {
                last_error: PacedLookupError::Lookup(error),
                attempts,
            } => {
                let status = error.provider_status();
                AddressOutcome::Recorded(GeocodeResult::failed(
                    position,
                    error.into_failure(address, attempts),
                    status,
                    attempts,
                ))
            }
            RetryOutcome::Completed {
                result: Err(PacedLookupError::Cancelled),
                ..
            }
            | RetryOutcome::Exhausted {
                last_error: PacedLookupError::Cancelled,
                ..
            }
            | RetryOutcome::Cancelled { .. } => AddressOutcome::Abandoned,
        }
    }

    fn cancelled(&self, batch: Batch, total: usize) -> BatchRun {
        log::warn!(
            "Geocoding cancelled after {} of {} addresses",
            batch.len(),
            total
        );
        BatchRun {
            batch,
            completion: RunCompletion::Cancelled,
            requested: total,
        }
    }
}

/// A lookup attempt, or the pacing wait before it being cancelled.
#[derive(Debug)]
enum PacedLookupError {
    Lookup(LookupError),
    Cancelled,
}

impl PacedLookupError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Lookup(e) if e.is_retryable())
    }
}

impl std::fmt::Display for PacedLookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lookup(e) => write!(f, "{}", e),
            Self::Cancelled => write!(f, "{}", Cancelled),
        }
    }
}

fn log_result(result: &GeocodeResult) {
    match &result.outcome {
        Ok(coordinate) => log::info!("{} => {}", result.address, coordinate),
        Err(failure) => log::warn!("Failed to geocode: {}", failure),
    }
}
