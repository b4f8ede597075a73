//! Round trip against a real MySQL or Galera node.
//!
//! Ignored by default. Run with:
//!
//! ```text
//! MYSQL_TEST_HOST=127.0.0.1 MYSQL_TEST_PASSWORD=... cargo test -p loadtest-mysql -- --ignored
//! ```

use loadtest_engine::{
    BenchConfig, ErrorCategory, RowCounts, TargetRegistry, WorkloadDriver,
};
use loadtest_mysql::{
    discover_bounds, drop_databases, list_databases, Endpoint, MySQLConnectionProvider, MySQLPopulator,
};
use std::sync::Arc;

fn endpoint() -> Endpoint {
    let host = std::env::var("MYSQL_TEST_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("MYSQL_TEST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3306);
    Endpoint::new(host, port)
}

fn provider() -> MySQLConnectionProvider {
    let user = std::env::var("MYSQL_TEST_USER").unwrap_or_else(|_| "root".to_string());
    let password = std::env::var("MYSQL_TEST_PASSWORD").unwrap_or_default();
    MySQLConnectionProvider::new(vec![endpoint()], user, password).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a running MySQL server"]
async fn test_populate_run_cleanup() {
    let prefix = "gbench_it_";
    let counts = RowCounts::new(50, 20, 40, 100);
    let provider = provider();

    let populator = MySQLPopulator::new(provider.opts(&endpoint(), None)).with_batch_size(16);
    let (found, metrics) = populator
        .populate_database("gbench_it_test1", counts, 42)
        .await
        .unwrap();
    assert_eq!(found, counts);
    assert_eq!(metrics.rows_inserted, counts.total());
    populator.disconnect().await.unwrap();

    let mut conn = mysql_async::Conn::new(provider.opts(&endpoint(), None))
        .await
        .unwrap();
    assert_eq!(discover_bounds(&mut conn, "gbench_it_test1").await.unwrap(), counts);
    conn.disconnect().await.unwrap();

    let registry = TargetRegistry::from_prefix(prefix, 1, found);
    let config = BenchConfig {
        workers: 4,
        queries_per_worker: 25,
        ..Default::default()
    };
    let mut driver = WorkloadDriver::new(config, registry, Arc::new(provider));
    let report = driver.run().await.unwrap();
    assert_eq!(report.stats.total_queries, 100);
    assert_eq!(
        report.stats.errors_by_category.get(&ErrorCategory::Connection),
        None
    );

    let admin = self::provider();
    let mut conn = mysql_async::Conn::new(admin.opts(&endpoint(), None))
        .await
        .unwrap();
    // Inserts from the run may extend the key range but never shrink it.
    let after = discover_bounds(&mut conn, "gbench_it_test1").await.unwrap();
    assert_eq!(counts.capped_at(&after), counts);

    let names = list_databases(&mut conn, prefix).await.unwrap();
    assert_eq!(names, vec!["gbench_it_test1".to_string()]);
    let summary = drop_databases(&mut conn, &names).await;
    assert_eq!(summary.dropped, names);
    assert!(summary.failed.is_empty());
    conn.disconnect().await.unwrap();
}
