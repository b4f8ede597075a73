//! Command-line interface for galera-bench
//!
//! # Usage Examples
//!
//! ## Populate
//! ```bash
//! # Create bench_test1..bench_test5 with the default row counts
//! galera-bench populate --hosts 10.0.0.1,10.0.0.2,10.0.0.3 \
//!   --user bench --password secret --databases 5
//! ```
//!
//! ## Run
//! ```bash
//! # 10 workers x 100 queries, mixed 1:1:1, markdown report to a file
//! galera-bench run --hosts 10.0.0.1,10.0.0.2,10.0.0.3 \
//!   --threads 10 --queries-per-thread 100 \
//!   --format markdown --output results.md
//!
//! # Read-only, no think time, 2s per-query timeout
//! galera-bench run --weights 1:0:0 --think-time 0 --query-timeout 2s
//! ```
//!
//! ## Cleanup
//! ```bash
//! galera-bench cleanup --prefix bench_ --yes
//! ```
//!
//! Every option can also be set through the environment (`DB_HOSTS`,
//! `DB_USER`, `BENCHMARK_THREADS`, ...) or a `.env` file in the working
//! directory.

use anyhow::Context;
use clap::{Parser, Subcommand};
use galera_bench::commands::{run_benchmark, run_cleanup, run_populate};
use galera_bench::config::{CleanupArgs, PopulateArgs, RunArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "galera-bench")]
#[command(about = "Concurrent read/write benchmark for MySQL and Galera clusters")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the benchmark databases and fill them with test data
    Populate {
        #[command(flatten)]
        args: PopulateArgs,
    },

    /// Run the benchmark against the populated databases
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Drop every database with the benchmark prefix
    Cleanup {
        #[command(flatten)]
        args: CleanupArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Settings from .env apply before argument parsing; a missing file is fine
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("Failed to load .env file");
        }
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Populate { args } => run_populate(args).await,
        Commands::Run { args } => run_benchmark(args).await,
        Commands::Cleanup { args } => run_cleanup(args).await,
    }
}
