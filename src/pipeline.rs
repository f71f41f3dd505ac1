// src/pipeline.rs
//! Pipeline capability traits for the stages of a batch run.
//!
//! Each trait describes a single capability, so a front end can swap one
//! stage (a test double, a different sink) without touching the others.

use crate::error::AppError;
use crate::geocoding::{BatchRun, CancelToken, ProgressReporter};
use crate::output::DeliveryReport;
use crate::source::AddressSource;

/// Reads the addresses to geocode.
pub trait AddressIntake {
    fn load(&self) -> Result<AddressSource, AppError>;
}

/// Turns addresses into a batch of results.
#[async_trait::async_trait]
pub trait BatchGeocoder {
    async fn geocode(
        &self,
        source: &AddressSource,
        progress: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<BatchRun, AppError>;
}

/// Receives the finished (or partial) run.
pub trait ResultSink {
    fn deliver(&self, source: &AddressSource, run: &BatchRun) -> Result<DeliveryReport, AppError>;
}
