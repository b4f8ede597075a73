//! Connection provider contract.
//!
//! The engine never talks to a database directly. A [`ConnectionProvider`]
//! opens one [`Session`] per worker and target; the session executes
//! parameter-bound statements and reports failures as categorised
//! [`ExecError`]s.

use crate::statement::Statement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a failed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Session could not be established or became unusable.
    Connection,
    /// Duplicate key, foreign key, or NOT NULL violation.
    Constraint,
    /// Lock wait timeout, deadlock, or certification conflict.
    LockConflict,
    /// Statement exceeded the configured query timeout.
    Timeout,
    /// Any other error reported by the server.
    Server,
    /// Iteration skipped because the run was cancelled.
    Cancelled,
    Other,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Connection => "connection",
            ErrorCategory::Constraint => "constraint",
            ErrorCategory::LockConflict => "lock_conflict",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Server => "server",
            ErrorCategory::Cancelled => "cancelled",
            ErrorCategory::Other => "other",
        };
        f.write_str(name)
    }
}

/// Failure executing a single statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{category} error: {message}")]
pub struct ExecError {
    pub category: ErrorCategory,
    pub message: String,
}

impl ExecError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            ErrorCategory::Timeout,
            format!("statement did not complete within {limit:?}"),
        )
    }

    /// The session can no longer be used for further statements.
    pub fn is_connection_lost(&self) -> bool {
        self.category == ErrorCategory::Connection
    }
}

/// Failure opening a session to a target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to open session to '{target}': {message}")]
pub struct ConnectionError {
    pub target: String,
    pub message: String,
}

impl ConnectionError {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Outcome of a successful execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// Rows returned by a query, or rows affected by a write.
    pub rows: u64,
}

/// A session bound to one target, exclusively owned by one worker.
#[async_trait]
pub trait Session: Send {
    async fn execute(&mut self, statement: &Statement) -> Result<ResultSet, ExecError>;

    /// Release the session. The default just drops it.
    async fn close(self: Box<Self>) {}
}

/// Supplies sessions bound to a database name.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn open(&self, target_name: &str) -> Result<Box<dyn Session>, ConnectionError>;
}
