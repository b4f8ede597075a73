//! galera-bench library
//!
//! Command-line configuration and command handlers for benchmarking MySQL
//! and Galera clusters.
//!
//! # CLI Usage
//!
//! ```bash
//! # Create and fill bench_test1..bench_test5
//! galera-bench populate --hosts node1,node2,node3 --user root --password secret
//!
//! # 10 workers x 100 queries, spread across the cluster nodes
//! galera-bench run --hosts node1,node2,node3 --threads 10 --queries-per-thread 100
//!
//! # Drop every bench_* database
//! galera-bench cleanup --hosts node1 --yes
//! ```
//!
//! The benchmark engine itself lives in `loadtest_engine`; the MySQL
//! connection provider, populator, and cleanup live in `loadtest_mysql`.

pub mod commands;
pub mod config;
pub mod logging;

pub use logging::mask_connection_password;
