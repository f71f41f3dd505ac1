// src/geocoding/progress.rs
//! Progress notifications, the only link between a run and its front end.

use crate::types::Address;

/// Emitted after each address has been processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress<'a> {
    pub processed: usize,
    pub total: usize,
    pub current: &'a Address,
}

impl Progress<'_> {
    /// Completed share of the run, between 0.0 and 1.0.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Receives progress from a running pipeline.
///
/// Closures taking `&Progress` implement this directly.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: &Progress<'_>);
}

impl<F> ProgressReporter for F
where
    F: Fn(&Progress<'_>) + Send + Sync,
{
    fn report(&self, progress: &Progress<'_>) {
        self(progress)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _progress: &Progress<'_>) {}
}
