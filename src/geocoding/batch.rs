// src/geocoding/batch.rs
//! Per-address results and the ordered batch they form.

use crate::error::{GeocodeFailure, ProviderStatus};
use crate::types::{Address, Coordinate};

/// The outcome of geocoding one address. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Zero-based index of the address in the input sequence.
    pub position: usize,
    pub address: Address,
    pub outcome: Result<Coordinate, GeocodeFailure>,
    /// Status string reported by the provider, when a response was parsed.
    pub provider_status: Option<ProviderStatus>,
    /// Requests sent for this address, retries included.
    pub attempts: u32,
}

impl GeocodeResult {
    pub fn located(position: usize, address: Address, coordinate: Coordinate, attempts: u32) -> Self {
        Self {
            position,
            address,
            outcome: Ok(coordinate),
            provider_status: Some(ProviderStatus::Ok),
            attempts,
        }
    }

    pub fn failed(
        position: usize,
        failure: GeocodeFailure,
        provider_status: Option<ProviderStatus>,
        attempts: u32,
    ) -> Self {
        Self {
            position,
            address: failure.address().clone(),
            outcome: Err(failure),
            provider_status,
            attempts,
        }
    }

    /// The coordinate, or `None` when the lookup failed.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.outcome.as_ref().ok().copied()
    }

    pub fn failure(&self) -> Option<&GeocodeFailure> {
        self.outcome.as_ref().err()
    }

    pub fn is_located(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Results in input order, one per processed address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    results: Vec<GeocodeResult>,
}

impl Batch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    /// Appends the next result. Positions must arrive in input order.
    pub(crate) fn push(&mut self, result: GeocodeResult) {
        debug_assert_eq!(result.position, self.results.len());
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[GeocodeResult] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeocodeResult> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a GeocodeResult;
    type IntoIter = std::slice::Iter<'a, GeocodeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCompletion {
    /// Every address was processed.
    Completed,
    /// The run stopped early; the batch holds the addresses processed so far.
    Cancelled,
}

/// A finished (or cancelled) run: the batch plus how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRun {
    pub batch: Batch,
    pub completion: RunCompletion,
    /// Number of addresses the run was asked to process.
    pub requested: usize,
}

impl BatchRun {
    pub fn is_complete(&self) -> bool {
        self.completion == RunCompletion::Completed
    }
}
