//! MySQL / Galera backend for galera-bench.
//!
//! Provides the [`MySQLConnectionProvider`] the engine runs against, plus the
//! populator that creates and fills the benchmark databases and the cleanup
//! routine that drops them again.

pub mod args;
pub mod cleanup;
pub mod error;
pub mod populator;
pub mod provider;
pub mod rows;
pub mod schema;

pub use args::{ConnectionArgs, DatasetArgs, Endpoint};
pub use cleanup::{drop_databases, filter_by_prefix, list_databases, CleanupSummary};
pub use error::MySQLBenchError;
pub use populator::{discover_bounds, MySQLPopulator, PopulateMetrics, DEFAULT_BATCH_SIZE};
pub use provider::{classify, MySQLConnectionProvider, MySQLSession};
