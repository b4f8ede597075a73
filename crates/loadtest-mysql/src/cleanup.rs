//! Removal of benchmark databases.

use crate::error::MySQLBenchError;
use crate::schema;
use mysql_async::prelude::*;
use mysql_async::Conn;
use tracing::{error, info};

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub dropped: Vec<String>,
    /// Databases that could not be dropped, with the error message.
    pub failed: Vec<(String, String)>,
}

/// Keep the names that start with `prefix`, sorted.
pub fn filter_by_prefix(names: Vec<String>, prefix: &str) -> Vec<String> {
    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .collect();
    matching.sort();
    matching
}

/// List the databases whose names start with `prefix`.
///
/// An empty prefix is rejected since it would match the system schemas.
pub async fn list_databases(conn: &mut Conn, prefix: &str) -> Result<Vec<String>, MySQLBenchError> {
    if prefix.is_empty() {
        return Err(MySQLBenchError::Config(
            "refusing to match databases with an empty prefix".to_string(),
        ));
    }
    let names: Vec<String> = conn.query("SHOW DATABASES").await?;
    Ok(filter_by_prefix(names, prefix))
}

/// Drop each database in turn. A failure is logged and the rest still run.
pub async fn drop_databases(conn: &mut Conn, names: &[String]) -> CleanupSummary {
    let mut summary = CleanupSummary::default();
    for name in names {
        let result = match schema::drop_database(name) {
            Ok(sql) => conn.query_drop(sql).await.map_err(MySQLBenchError::from),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                info!("Dropped database {name}");
                summary.dropped.push(name.clone());
            }
            Err(e) => {
                error!("Error dropping database {name}: {e}");
                summary.failed.push((name.clone(), e.to_string()));
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_prefix() {
        let names = vec![
            "information_schema".to_string(),
            "bench_test2".to_string(),
            "mysql".to_string(),
            "bench_test1".to_string(),
            "other_bench_test1".to_string(),
        ];
        assert_eq!(
            filter_by_prefix(names, "bench_"),
            vec!["bench_test1".to_string(), "bench_test2".to_string()]
        );
    }

    #[test]
    fn test_filter_without_matches() {
        assert!(filter_by_prefix(vec!["mysql".to_string()], "bench_").is_empty());
    }
}
