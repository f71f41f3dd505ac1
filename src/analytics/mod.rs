// src/analytics/mod.rs
//! Batch measurement for user-facing completion reports.

use crate::error::FailureKind;
use crate::geocoding::{Batch, BatchRun};
use std::collections::BTreeMap;

/// Counts for a finished or partial run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub requested: usize,
    pub processed: usize,
    pub located: usize,
    pub failures: BTreeMap<FailureKind, usize>,
    /// Requests sent beyond the first attempt per address.
    pub retries: u64,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    /// One-line description such as `"8 of 10 located; 1 no match, 1 transport error"`.
    pub fn describe(&self) -> String {
        let mut line = format!("{} of {} located", self.located, self.processed);
        if !self.failures.is_empty() {
            let parts: Vec<String> = self
                .failures
                .iter()
                .map(|(kind, count)| format!("{} {}", count, kind))
                .collect();
            line.push_str("; ");
            line.push_str(&parts.join(", "));
        }
        line
    }
}

/// Measures a batch.
pub fn summarize_batch(batch: &Batch) -> BatchSummary {
    let mut summary = BatchSummary {
        requested: batch.len(),
        processed: batch.len(),
        ..BatchSummary::default()
    };

    for result in batch {
        summary.retries += u64::from(result.attempts.saturating_sub(1));
        match result.failure() {
            None => summary.located += 1,
            Some(failure) => *summary.failures.entry(failure.kind()).or_default() += 1,
        }
    }

    summary
}

/// Measures a run, including how many addresses it was asked to process.
pub fn summarize_run(run: &BatchRun) -> BatchSummary {
    BatchSummary {
        requested: run.requested,
        ..summarize_batch(&run.batch)
    }
}
