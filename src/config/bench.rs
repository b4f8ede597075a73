//! Arguments for the `run` command.

use crate::config::duration::parse_duration_arg;
use anyhow::Context;
use clap::{Args, ValueEnum};
use loadtest_engine::{BenchConfig, OperationWeights, ReportFormat, RowCounts, Target, TargetRegistry};
use loadtest_mysql::{ConnectionArgs, DatasetArgs};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Markdown,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => ReportFormat::Table,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Markdown => ReportFormat::Markdown,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Upper limits on the ids used by reads and updates; each database is
    /// further bounded by the rows it actually holds
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Number of concurrent workers
    #[arg(long, env = "BENCHMARK_THREADS", default_value = "10")]
    pub threads: usize,

    /// Queries issued by each worker
    #[arg(long, env = "BENCHMARK_QUERIES_PER_THREAD", default_value = "100")]
    pub queries_per_thread: u64,

    /// Run seed; worker `i` draws from `seed + i`
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Relative read:insert:update weights
    #[arg(long, default_value = "1:1:1")]
    pub weights: OperationWeights,

    /// Pause after each query (e.g. 100ms, 0 to disable)
    #[arg(long, default_value = "100ms", value_parser = parse_duration_arg)]
    pub think_time: Duration,

    /// Abandon a query after this long and count it as a timeout
    #[arg(long, value_parser = parse_duration_arg)]
    pub query_timeout: Option<Duration>,

    /// Log progress at this interval while the run is in flight
    #[arg(long, value_parser = parse_duration_arg)]
    pub progress_interval: Option<Duration>,

    /// Report format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    /// Validated engine configuration.
    pub fn bench_config(&self) -> anyhow::Result<BenchConfig> {
        if self.query_timeout == Some(Duration::ZERO) {
            anyhow::bail!("--query-timeout must be greater than zero");
        }
        if self.progress_interval == Some(Duration::ZERO) {
            anyhow::bail!("--progress-interval must be greater than zero");
        }

        let config = BenchConfig {
            workers: self.threads,
            queries_per_worker: self.queries_per_thread,
            seed: self.seed,
            weights: self.weights,
            think_time: self.think_time,
            query_timeout: self.query_timeout,
            progress_interval: self.progress_interval,
        };
        config
            .validate()
            .context("Invalid benchmark configuration")?;
        Ok(config)
    }

    /// Targets `{prefix}test1 ..= {prefix}test{databases}`.
    pub fn registry(&self) -> TargetRegistry {
        TargetRegistry::from_prefix(
            &self.connection.prefix,
            self.dataset.databases,
            self.dataset.row_counts(),
        )
    }

    /// Targets bounded by the keys that actually exist in each database.
    ///
    /// `discovered` holds the contiguous id range found per target, in
    /// [`RunArgs::registry`] order. The dataset flags act as upper limits.
    pub fn bounded_registry(&self, discovered: &[(String, RowCounts)]) -> TargetRegistry {
        let configured = self.dataset.row_counts();
        let targets = discovered
            .iter()
            .map(|(name, found)| {
                let rows = configured.capped_at(found);
                if rows != configured {
                    warn!(
                        "{name} holds fewer rows than configured, using users={} products={} orders={} order_items={}",
                        rows.users, rows.products, rows.orders, rows.order_items
                    );
                }
                Target::new(name.clone(), rows)
            })
            .collect();
        TargetRegistry::new(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    fn parse(args: &[&str]) -> RunArgs {
        let mut argv = vec!["galera-bench"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).run
    }

    #[test]
    fn test_flags_map_to_bench_config() {
        let args = parse(&[
            "--threads",
            "4",
            "--queries-per-thread",
            "25",
            "--weights",
            "8:1:1",
            "--think-time",
            "0",
            "--query-timeout",
            "2s",
        ]);
        let config = args.bench_config().unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.queries_per_worker, 25);
        assert_eq!(config.weights, OperationWeights::new(8, 1, 1));
        assert_eq!(config.think_time, Duration::ZERO);
        assert_eq!(config.query_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.progress_interval, None);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let args = parse(&["--threads", "0"]);
        assert!(args.bench_config().is_err());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let args = parse(&["--weights", "0:0:0"]);
        assert!(args.bench_config().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let args = parse(&["--query-timeout", "0ms"]);
        assert!(args.bench_config().is_err());
    }

    #[test]
    fn test_registry_from_dataset() {
        let args = parse(&["--prefix", "gb_", "--databases", "3", "--users", "10"]);
        let registry = args.registry();
        assert_eq!(
            registry.names(),
            vec!["gb_test1", "gb_test2", "gb_test3"]
        );
        assert_eq!(registry.targets()[0].rows().users, 10);
    }

    #[test]
    fn test_bounded_registry_clamps_to_existing_rows() {
        let args = parse(&[
            "--prefix",
            "gb_",
            "--databases",
            "2",
            "--users",
            "1000",
            "--products",
            "500",
            "--orders",
            "2000",
            "--order-items",
            "5000",
        ]);
        let discovered = vec![
            ("gb_test1".to_string(), RowCounts::new(100, 800, 2000, 5000)),
            ("gb_test2".to_string(), RowCounts::new(1200, 600, 2100, 5100)),
        ];
        let registry = args.bounded_registry(&discovered);
        assert_eq!(registry.names(), vec!["gb_test1", "gb_test2"]);
        assert_eq!(
            *registry.targets()[0].rows(),
            RowCounts::new(100, 500, 2000, 5000)
        );
        assert_eq!(*registry.targets()[1].rows(), args.dataset.row_counts());
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_bounded_registry_unpopulated_database_rejected() {
        let args = parse(&["--prefix", "gb_", "--databases", "1", "--users", "10"]);
        let discovered = vec![("gb_test1".to_string(), RowCounts::default())];
        let registry = args.bounded_registry(&discovered);
        assert_eq!(registry.targets()[0].rows().users, 0);
        assert!(registry.validate().is_err());
    }

    #[test]
    fn test_output_format_maps_to_report_format() {
        let args = parse(&["--format", "markdown"]);
        assert_eq!(ReportFormat::from(args.format), ReportFormat::Markdown);
    }
}
