//! Command-line configuration, converted to validated engine settings.

pub mod bench;
pub mod dataset;
pub mod duration;

pub use bench::{OutputFormat, RunArgs};
pub use dataset::{CleanupArgs, PopulateArgs};
pub use duration::{parse_duration, parse_duration_arg};
