//! Parameter-bound statements.
//!
//! SQL text is `&'static str`: every value that varies between executions
//! travels as a bound [`Param`], so statement text never carries data.

use serde::Serialize;

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Int(i64),
    Text(String),
    /// Fixed-point decimal rendered with two fractional digits, e.g. `"19.99"`.
    Decimal(String),
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

/// SQL text with `?` placeholders plus the values bound to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: &'static str,
    params: Vec<Param>,
}

impl Statement {
    pub fn new(sql: &'static str, params: Vec<Param>) -> Self {
        debug_assert_eq!(
            sql.matches('?').count(),
            params.len(),
            "placeholder count mismatch for: {sql}"
        );
        Self { sql, params }
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.sql, self.params)
    }
}
