//! Workload driver: starts the workers, joins them, and takes the final
//! snapshot.

use crate::aggregator::{AggregateStats, MetricsAggregator};
use crate::error::RunError;
use crate::operation::OperationWeights;
use crate::selector::QuerySelector;
use crate::session::ConnectionProvider;
use crate::target::TargetRegistry;
use crate::worker::{worker_seed, Worker, WorkerSettings, WorkerShared, WorkerSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Already-validated run parameters.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub workers: usize,
    pub queries_per_worker: u64,
    /// Run-level seed; worker `i` uses `seed + i`.
    pub seed: u64,
    pub weights: OperationWeights,
    /// Pause after each statement, outside the timed region.
    pub think_time: Duration,
    pub query_timeout: Option<Duration>,
    /// Log a progress snapshot at this interval while workers run.
    pub progress_interval: Option<Duration>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            queries_per_worker: 100,
            seed: 42,
            weights: OperationWeights::default(),
            think_time: Duration::ZERO,
            query_timeout: None,
            progress_interval: None,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<(), RunError> {
        if self.workers == 0 {
            return Err(RunError::NoWorkers);
        }
        if self.weights.is_zero() {
            return Err(RunError::ZeroWeights);
        }
        if self.checked_planned_queries().is_none() {
            return Err(RunError::PlanTooLarge {
                workers: self.workers,
                queries_per_worker: self.queries_per_worker,
            });
        }
        Ok(())
    }

    fn checked_planned_queries(&self) -> Option<u64> {
        u64::try_from(self.workers)
            .ok()?
            .checked_mul(self.queries_per_worker)
    }

    /// Total number of samples the run must produce. Saturates for plans
    /// that [`validate`](Self::validate) rejects.
    pub fn planned_queries(&self) -> u64 {
        self.checked_planned_queries().unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverState {
    Idle,
    Running,
    Draining,
    Complete,
}

/// Everything the report renderer needs about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub workers: usize,
    pub queries_per_worker: u64,
    pub seed: u64,
    pub targets: Vec<String>,
    /// Set when the run was cancelled before every worker finished its plan.
    pub cancelled: bool,
    pub stats: AggregateStats,
}

pub struct WorkloadDriver {
    config: BenchConfig,
    registry: Arc<TargetRegistry>,
    provider: Arc<dyn ConnectionProvider>,
    cancel: CancellationToken,
    state: DriverState,
}

impl WorkloadDriver {
    pub fn new(
        config: BenchConfig,
        registry: TargetRegistry,
        provider: Arc<dyn ConnectionProvider>,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            provider,
            cancel: CancellationToken::new(),
            state: DriverState::Idle,
        }
    }

    /// Token that stops all workers after their in-flight statement.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Run every worker to completion and return the final report.
    ///
    /// Configuration problems are rejected before any worker starts. A worker
    /// that panics or is aborted makes the whole run fail: without a full
    /// join there is no valid report.
    pub async fn run(&mut self) -> Result<RunReport, RunError> {
        self.config.validate()?;
        self.registry.validate()?;
        let selector = Arc::new(QuerySelector::new(self.config.weights)?);

        let planned = self.config.planned_queries();
        let aggregator = Arc::new(MetricsAggregator::with_capacity(
            usize::try_from(planned).unwrap_or(0),
        ));

        let shared = WorkerShared {
            registry: Arc::clone(&self.registry),
            selector,
            provider: Arc::clone(&self.provider),
            aggregator: Arc::clone(&aggregator),
            cancel: self.cancel.clone(),
        };
        let settings = WorkerSettings {
            queries: self.config.queries_per_worker,
            think_time: self.config.think_time,
            query_timeout: self.config.query_timeout,
        };

        info!(
            "Starting benchmark with {} workers x {} queries against {} database(s) (seed={}, weights={})",
            self.config.workers,
            self.config.queries_per_worker,
            self.registry.len(),
            self.config.seed,
            self.config.weights
        );

        let started_at = Utc::now();
        let start = Instant::now();
        self.state = DriverState::Running;

        let mut workers = JoinSet::new();
        for id in 0..self.config.workers {
            let worker = Worker::new(
                id,
                worker_seed(self.config.seed, id),
                settings,
                shared.clone(),
            );
            workers.spawn(worker.run());
        }
        drop(shared);

        self.state = DriverState::Draining;
        debug!("All {} workers started, waiting for completion", self.config.workers);

        let summaries = match self.join_all(&mut workers, &aggregator, planned, start).await {
            Ok(summaries) => summaries,
            Err(e) => {
                self.cancel.cancel();
                workers.abort_all();
                return Err(e);
            }
        };

        let elapsed = start.elapsed();
        let completed_at = Utc::now();

        let halted = summaries.iter().filter(|s| s.halted.is_some()).count();
        if halted > 0 {
            info!("{halted} worker(s) stopped issuing statements early");
        }

        let stats = match Arc::try_unwrap(aggregator) {
            Ok(aggregator) => aggregator.finish(elapsed),
            Err(shared) => shared.snapshot(elapsed),
        };

        if stats.total_queries != planned {
            return Err(RunError::IncompleteRun {
                expected: planned,
                recorded: stats.total_queries,
            });
        }

        self.state = DriverState::Complete;
        info!(
            "Benchmark complete: {} queries, {} errors in {:.2}s",
            stats.total_queries,
            stats.total_errors,
            elapsed.as_secs_f64()
        );

        Ok(RunReport {
            started_at,
            completed_at,
            workers: self.config.workers,
            queries_per_worker: self.config.queries_per_worker,
            seed: self.config.seed,
            targets: self.registry.names(),
            cancelled: self.cancel.is_cancelled(),
            stats,
        })
    }

    async fn join_all(
        &self,
        workers: &mut JoinSet<WorkerSummary>,
        aggregator: &MetricsAggregator,
        planned: u64,
        start: Instant,
    ) -> Result<Vec<WorkerSummary>, RunError> {
        let mut summaries = Vec::with_capacity(self.config.workers);
        let mut ticker = self.config.progress_interval.map(|period| {
            tokio::time::interval_at(tokio::time::Instant::now() + period, period)
        });

        loop {
            let joined = match ticker.as_mut() {
                Some(ticker) => {
                    tokio::select! {
                        joined = workers.join_next() => joined,
                        _ = ticker.tick() => {
                            log_progress(aggregator, planned, start);
                            continue;
                        }
                    }
                }
                None => workers.join_next().await,
            };

            match joined {
                None => return Ok(summaries),
                Some(Ok(summary)) => {
                    debug!(
                        "Worker {} joined ({} failures)",
                        summary.worker_id, summary.failures
                    );
                    summaries.push(summary);
                }
                Some(Err(e)) => {
                    error!("Worker terminated without completing: {e}");
                    return Err(RunError::WorkerLost(e.to_string()));
                }
            }
        }
    }
}

fn log_progress(aggregator: &MetricsAggregator, planned: u64, start: Instant) {
    let snapshot = aggregator.snapshot(start.elapsed());
    info!(
        "Progress: {}/{} queries, {} errors, {:.1} q/s so far",
        snapshot.total_queries, planned, snapshot.total_errors, snapshot.queries_per_second
    );
}
