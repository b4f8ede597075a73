//! Error types for the MySQL backend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MySQLBenchError {
    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Name that cannot be used as a database identifier.
    #[error("Invalid database name '{0}': only [A-Za-z0-9_$] allowed, at most 64 characters")]
    InvalidIdentifier(String),

    /// Child rows requested for a table whose parent table is empty.
    #[error("Cannot generate {table} rows: referenced table '{parent}' has no rows")]
    MissingParent {
        table: &'static str,
        parent: &'static str,
    },
}
