//! Handlers for the `populate`, `run`, and `cleanup` commands.

pub mod cleanup;
pub mod populate;
pub mod run;

pub use cleanup::run_cleanup;
pub use populate::run_populate;
pub use run::run_benchmark;
