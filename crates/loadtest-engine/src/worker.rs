//! Execution units.
//!
//! A worker runs a fixed number of iterations. Each iteration draws a work
//! item from its own seeded RNG, executes it on a session the worker owns
//! exclusively, and records exactly one sample whatever the outcome.
//!
//! Query failures are counted and the loop continues. Once the connection is
//! lost (or the run is cancelled) the worker stops touching the network and
//! records every remaining iteration as an immediate failure, so the planned
//! sample count is always reached.

use crate::aggregator::MetricsAggregator;
use crate::sample::Sample;
use crate::selector::{QuerySelector, WorkItem};
use crate::session::{ConnectionError, ConnectionProvider, ErrorCategory, ExecError, Session};
use crate::target::{Target, TargetRegistry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Seed for worker `index`, derived from the run seed.
pub fn worker_seed(run_seed: u64, index: usize) -> u64 {
    run_seed.wrapping_add(index as u64)
}

/// What a worker reports back when it joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub completed: u64,
    pub failures: u64,
    /// Set when the worker stopped issuing statements early.
    pub halted: Option<ErrorCategory>,
}

/// Resources shared by every worker of a run.
#[derive(Clone)]
pub struct WorkerShared {
    pub registry: Arc<TargetRegistry>,
    pub selector: Arc<QuerySelector>,
    pub provider: Arc<dyn ConnectionProvider>,
    pub aggregator: Arc<MetricsAggregator>,
    pub cancel: CancellationToken,
}

/// Per-worker tunables.
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub queries: u64,
    pub think_time: Duration,
    pub query_timeout: Option<Duration>,
}

pub struct Worker {
    id: usize,
    rng: StdRng,
    settings: WorkerSettings,
    shared: WorkerShared,
}

impl Worker {
    pub fn new(id: usize, seed: u64, settings: WorkerSettings, shared: WorkerShared) -> Self {
        Self {
            id,
            rng: StdRng::seed_from_u64(seed),
            settings,
            shared,
        }
    }

    pub async fn run(mut self) -> WorkerSummary {
        debug!(worker = self.id, queries = self.settings.queries, "Worker started");

        let shared = self.shared.clone();
        let mut sessions: HashMap<String, Box<dyn Session>> = HashMap::new();
        let mut halted: Option<ErrorCategory> = None;
        let mut failures = 0u64;

        for _ in 0..self.settings.queries {
            let item = shared.selector.next(&mut self.rng, &shared.registry);

            if halted.is_none() && shared.cancel.is_cancelled() {
                debug!(worker = self.id, "Cancellation requested, skipping remaining iterations");
                halted = Some(ErrorCategory::Cancelled);
            }

            let sample = match halted {
                Some(category) => Sample::failure(item.kind, Duration::ZERO, category),
                None => {
                    let sample = self.attempt(&mut sessions, &item).await;
                    if sample.category() == Some(ErrorCategory::Connection) {
                        warn!(
                            worker = self.id,
                            target = item.target.name(),
                            "Connection lost, failing remaining iterations without network calls"
                        );
                        halted = Some(ErrorCategory::Connection);
                    }
                    sample
                }
            };

            if !sample.is_success() {
                failures += 1;
            }
            shared.aggregator.record(sample);

            if halted.is_none() && !self.settings.think_time.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.settings.think_time) => {}
                    _ = shared.cancel.cancelled() => {}
                }
            }
        }

        for (_, session) in sessions.drain() {
            session.close().await;
        }

        debug!(
            worker = self.id,
            failures,
            halted = ?halted,
            "Worker finished"
        );

        WorkerSummary {
            worker_id: self.id,
            completed: self.settings.queries,
            failures,
            halted,
        }
    }

    /// Open (or reuse) the session for the item's target and execute it.
    async fn attempt(
        &self,
        sessions: &mut HashMap<String, Box<dyn Session>>,
        item: &WorkItem<'_>,
    ) -> Sample {
        let started = Instant::now();
        let session = match self.session_for(sessions, item.target).await {
            Ok(session) => session,
            Err(e) => {
                warn!(worker = self.id, error = %e, "Failed to open session");
                return Sample::failure(item.kind, started.elapsed(), ErrorCategory::Connection);
            }
        };

        let started = Instant::now();
        let result = match self.settings.query_timeout {
            Some(limit) => tokio::time::timeout(limit, session.execute(&item.statement))
                .await
                .unwrap_or_else(|_| Err(ExecError::timeout(limit))),
            None => session.execute(&item.statement).await,
        };
        let elapsed = started.elapsed();

        match result {
            Ok(_) => Sample::success(item.kind, elapsed),
            Err(e) => {
                debug!(
                    worker = self.id,
                    kind = %item.kind,
                    target = item.target.name(),
                    error = %e,
                    "Query failed"
                );
                if e.category == ErrorCategory::Timeout {
                    // The abandoned statement leaves the session mid-protocol.
                    sessions.remove(item.target.name());
                }
                Sample::failure(item.kind, elapsed, e.category)
            }
        }
    }

    async fn session_for<'s>(
        &self,
        sessions: &'s mut HashMap<String, Box<dyn Session>>,
        target: &Target,
    ) -> Result<&'s mut Box<dyn Session>, ConnectionError> {
        match sessions.entry(target.name().to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let session = self.shared.provider.open(target.name()).await?;
                debug!(worker = self.id, target = target.name(), "Session opened");
                Ok(entry.insert(session))
            }
        }
    }
}
