//! Arguments for the populate and cleanup commands.

use clap::Args;
use loadtest_mysql::{ConnectionArgs, DatasetArgs, DEFAULT_BATCH_SIZE};

#[derive(Args, Clone, Debug)]
pub struct PopulateArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Batch size for INSERT statements
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Random seed for deterministic generation (same seed = same data)
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

#[derive(Args, Clone, Debug)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Drop without asking for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}
