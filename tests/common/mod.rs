// tests/common/mod.rs
//! Shared fixtures for integration tests.

#![allow(dead_code)]

use geobatch::{
    Address, ApiKey, BackoffPolicy, Coordinate, GeocoderSettings, GeocodingProvider, LookupError,
    ProviderStatus,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted provider reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(f64, f64),
    ZeroResults,
    OverQueryLimit,
    Status(&'static str),
    HttpStatus(u16),
    Transport,
}

impl Reply {
    fn into_result(self) -> Result<Coordinate, LookupError> {
        match self {
            Reply::Ok(lat, lng) => Ok(Coordinate::new(lat, lng)),
            Reply::ZeroResults => Err(LookupError::NoMatch),
            Reply::OverQueryLimit => Err(LookupError::OverQueryLimit),
            Reply::Status(status) => Err(LookupError::Rejected(ProviderStatus::from_api_response(
                status,
            ))),
            Reply::HttpStatus(code) => Err(LookupError::HttpStatus(code)),
            Reply::Transport => Err(LookupError::Transport("connection refused".to_string())),
        }
    }
}

/// Provider double that answers from a per-address script and records calls.
///
/// An address with an exhausted or missing script gets `ZERO_RESULTS`.
#[derive(Default)]
pub struct StubProvider {
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, address: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.script
            .lock()
            .entry(address.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Addresses in the order requests were made.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait::async_trait]
impl GeocodingProvider for StubProvider {
    async fn lookup(&self, address: &Address, _key: &ApiKey) -> Result<Coordinate, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(address.to_string());
        let reply = self
            .script
            .lock()
            .get_mut(address.as_str())
            .and_then(VecDeque::pop_front)
            .unwrap_or(Reply::ZeroResults);
        reply.into_result()
    }
}

pub fn addresses(texts: &[&str]) -> Vec<Address> {
    texts.iter().map(|t| Address::new(t).unwrap()).collect()
}

/// Settings with a key, no jitter, and pacing fast enough for tests.
pub fn settings_with_backoff(initial: Duration, max_attempts: u32) -> GeocoderSettings {
    GeocoderSettings {
        api_key: Some(ApiKey::new("AIzaIntegrationTestKey").unwrap()),
        backoff: BackoffPolicy {
            max_attempts,
            initial_delay: initial,
            max_delay: initial * 16,
            jitter: Duration::ZERO,
        },
        requests_per_second: 1_000.0,
        burst: 100,
    }
}

pub fn fast_settings() -> GeocoderSettings {
    settings_with_backoff(Duration::from_millis(1), 5)
}
