//! Timing samples emitted by workers.

use crate::operation::OperationKind;
use crate::session::ErrorCategory;
use std::time::Duration;

/// Result of executing one work item. Both variants carry the time spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success { elapsed: Duration },
    Failure { elapsed: Duration, category: ErrorCategory },
}

/// One measured execution, produced exactly once per work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub kind: OperationKind,
    pub outcome: Outcome,
}

impl Sample {
    pub fn success(kind: OperationKind, elapsed: Duration) -> Self {
        Self {
            kind,
            outcome: Outcome::Success { elapsed },
        }
    }

    pub fn failure(kind: OperationKind, elapsed: Duration, category: ErrorCategory) -> Self {
        Self {
            kind,
            outcome: Outcome::Failure { elapsed, category },
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self.outcome {
            Outcome::Success { elapsed } | Outcome::Failure { elapsed, .. } => elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Error category, if the execution failed.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { category, .. } => Some(category),
        }
    }
}
