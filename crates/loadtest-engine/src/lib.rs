//! Concurrent benchmark execution engine for galera-bench.
//!
//! The engine fans a fixed amount of synthetic read/write work out across
//! independent workers, times every statement, and folds the resulting
//! samples into per-operation latency statistics.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!                 │        WorkloadDriver        │
//!                 │ Idle → Running → Draining →  │
//!                 │           Complete           │
//!                 └──────────────┬───────────────┘
//!            spawns N            │          joins N
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//!  ┌────────────┐          ┌────────────┐          ┌────────────┐
//!  │  Worker 0  │          │  Worker 1  │          │  Worker N  │
//!  │ seed + 0   │          │ seed + 1   │          │ seed + N   │
//!  └─────┬──────┘          └─────┬──────┘          └─────┬──────┘
//!        │ QuerySelector → Session.execute → Sample      │
//!        └───────────────────────┼───────────────────────┘
//!                                ▼ record()
//!                 ┌──────────────────────────────┐
//!                 │      MetricsAggregator       │
//!                 └──────────────┬───────────────┘
//!                                ▼ finish()
//!                 AggregateStats → report::format_*
//! ```
//!
//! The engine is database-agnostic: statements are parameter-bound
//! [`Statement`]s executed through the [`ConnectionProvider`] and [`Session`]
//! traits. The MySQL implementation lives in the `loadtest-mysql` crate.

pub mod aggregator;
pub mod driver;
pub mod error;
pub mod operation;
pub mod report;
pub mod sample;
pub mod selector;
pub mod session;
pub mod statement;
pub mod synth;
pub mod target;
pub mod worker;

pub use aggregator::{AggregateStats, MetricsAggregator, OperationStats};
pub use driver::{BenchConfig, DriverState, RunReport, WorkloadDriver};
pub use error::RunError;
pub use operation::{OperationKind, OperationWeights};
pub use report::ReportFormat;
pub use sample::{Outcome, Sample};
pub use selector::{QuerySelector, WorkItem};
pub use session::{ConnectionError, ConnectionProvider, ErrorCategory, ExecError, ResultSet, Session};
pub use statement::{Param, Statement};
pub use target::{Entity, RowCounts, Target, TargetRegistry};
pub use worker::WorkerSummary;
