// src/geocoding/rate_limiter.rs
//! Token bucket that paces requests to the provider's quota.

use super::cancel::{CancelToken, Cancelled};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Shortest sleep between refill checks, so waits never spin.
const MIN_WAIT: Duration = Duration::from_millis(1);

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter.
///
/// Allows bursting up to `capacity` requests, then refills at
/// `refill_rate` requests per second. With a capacity of one this is an
/// evenly spaced pacer.
pub struct RateLimiter {
    state: Mutex<BucketState>,
    capacity: f64,
    refill_rate: f64,
}

impl RateLimiter {
    /// Create a limiter for `requests_per_second` with the given burst size.
    /// The bucket starts full.
    ///
    /// # Panics
    ///
    /// Panics if `requests_per_second` is not positive or `burst` is zero.
    /// Configuration is validated before a limiter is built.
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        assert!(
            requests_per_second > 0.0,
            "requests_per_second must be positive"
        );
        assert!(burst > 0, "burst must be positive");

        let capacity = f64::from(burst);
        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_rate: requests_per_second,
        }
    }

    /// Take one token, waiting until one is available.
    ///
    /// Returns `Err(Cancelled)` if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancelToken) -> Result<(), Cancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }

            let wait = self.try_take();
            if wait.is_zero() {
                return Ok(());
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Cancelled),
                () = tokio::time::sleep(wait.max(MIN_WAIT)) => {}
            }
        }
    }

    /// Takes a token without waiting. Returns `Duration::ZERO` on success,
    /// otherwise the time until a token will be available.
    fn try_take(&self) -> Duration {
        let mut state = self.state.lock();
        self.refill(&mut state);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            return Duration::ZERO;
        }

        let needed = 1.0 - state.tokens;
        Duration::try_from_secs_f64(needed / self.refill_rate).unwrap_or(Duration::MAX)
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.last_refill = now;
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
    }

    /// Tokens currently available (refills as a side effect).
    pub fn available(&self) -> f64 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }
}
