//! Fatal run-abort conditions.
//!
//! Query and connection failures never show up here: workers absorb them and
//! they only surface as error counts in the final statistics.

use thiserror::Error;

/// Conditions that prevent a run from producing a valid report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// No databases to run against.
    #[error("Configuration error: target registry is empty")]
    EmptyRegistry,

    /// A target has no addressable rows, so reads and updates have no valid keys.
    #[error("Configuration error: target '{0}' has no users rows to address")]
    EmptyTarget(String),

    /// Zero workers configured.
    #[error("Configuration error: worker count must be at least 1")]
    NoWorkers,

    /// Every operation weight is zero.
    #[error("Configuration error: operation weights are all zero")]
    ZeroWeights,

    /// `workers * queries_per_worker` does not fit the sample counter.
    #[error("Configuration error: {workers} workers x {queries_per_worker} queries exceeds the maximum plan size")]
    PlanTooLarge {
        workers: usize,
        queries_per_worker: u64,
    },

    /// A worker panicked or was aborted before signalling completion.
    #[error("Worker terminated without completing: {0}")]
    WorkerLost(String),

    /// The joined workers recorded a different number of samples than planned.
    #[error("Run recorded {recorded} samples, expected {expected}")]
    IncompleteRun { expected: u64, recorded: u64 },
}

impl RunError {
    /// Whether the run was rejected before any worker started.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RunError::EmptyRegistry
                | RunError::EmptyTarget(_)
                | RunError::NoWorkers
                | RunError::ZeroWeights
                | RunError::PlanTooLarge { .. }
        )
    }
}
