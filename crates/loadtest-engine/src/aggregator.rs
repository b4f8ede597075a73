//! Concurrency-safe accumulation of samples into latency statistics.
//!
//! Every duration is retained so medians and percentiles are exact; each
//! snapshot sorts a copy.

use crate::operation::OperationKind;
use crate::sample::Sample;
use crate::session::ErrorCategory;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Upper bound on samples reserved up front by [`MetricsAggregator::with_capacity`].
const MAX_RESERVED_SAMPLES: usize = 1 << 16;

#[derive(Debug, Default, Clone)]
struct KindAccumulator {
    durations: Vec<Duration>,
    total: Duration,
    errors: u64,
}

#[derive(Debug, Default)]
struct AggregatorState {
    kinds: [KindAccumulator; 3],
    errors_by_category: BTreeMap<ErrorCategory, u64>,
}

/// Shared sink for samples from every worker.
///
/// `record` takes the lock for the whole update, so concurrent workers never
/// lose increments.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    state: Mutex<AggregatorState>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the duration buffers for `expected` samples spread evenly
    /// across op kinds. The reservation is capped; buffers grow past it as
    /// samples arrive.
    pub fn with_capacity(expected: usize) -> Self {
        let per_kind = expected.min(MAX_RESERVED_SAMPLES) / OperationKind::ALL.len() + 1;
        let mut state = AggregatorState::default();
        for acc in &mut state.kinds {
            acc.durations.reserve(per_kind);
        }
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn record(&self, sample: Sample) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;
        let elapsed = sample.elapsed();
        let acc = &mut state.kinds[sample.kind.index()];
        acc.durations.push(elapsed);
        acc.total += elapsed;
        if let Some(category) = sample.category() {
            acc.errors += 1;
            *state.errors_by_category.entry(category).or_insert(0) += 1;
        }
    }

    /// Number of samples recorded so far.
    pub fn sample_count(&self) -> u64 {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.kinds.iter().map(|k| k.durations.len() as u64).sum()
    }

    /// Point-in-time statistics. While workers are still running this is
    /// necessarily incomplete and only suitable for progress reporting.
    pub fn snapshot(&self, elapsed: Duration) -> AggregateStats {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let kinds = state.kinds.clone();
        let errors_by_category = state.errors_by_category.clone();
        drop(state);
        build_stats(kinds, errors_by_category, elapsed)
    }

    /// Final statistics. Consuming the aggregator guarantees no sample can
    /// arrive afterwards.
    pub fn finish(self, elapsed: Duration) -> AggregateStats {
        let state = self.state.into_inner().unwrap_or_else(PoisonError::into_inner);
        build_stats(state.kinds, state.errors_by_category, elapsed)
    }
}

fn build_stats(
    kinds: [KindAccumulator; 3],
    errors_by_category: BTreeMap<ErrorCategory, u64>,
    elapsed: Duration,
) -> AggregateStats {
    let operations: Vec<OperationStats> = OperationKind::ALL
        .into_iter()
        .zip(kinds)
        .map(|(kind, acc)| OperationStats::from_accumulator(kind, acc))
        .collect();

    let total_queries = operations.iter().map(|o| o.count).sum();
    let total_errors = operations.iter().map(|o| o.errors).sum();

    AggregateStats {
        queries_per_second: queries_per_second(total_queries, elapsed),
        operations,
        total_queries,
        total_errors,
        errors_by_category,
        elapsed,
    }
}

/// Queries per second over the measured wall-clock duration. Zero when
/// nothing ran or no time elapsed.
pub fn queries_per_second(total_queries: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if total_queries > 0 && secs > 0.0 {
        total_queries as f64 / secs
    } else {
        0.0
    }
}

/// Latency statistics for one operation kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStats {
    pub kind: OperationKind,
    pub count: u64,
    pub errors: u64,
    #[serde(serialize_with = "as_secs")]
    pub mean: Duration,
    #[serde(serialize_with = "as_secs")]
    pub median: Duration,
    #[serde(serialize_with = "as_secs")]
    pub min: Duration,
    #[serde(serialize_with = "as_secs")]
    pub max: Duration,
    #[serde(serialize_with = "as_secs")]
    pub p95: Duration,
    #[serde(serialize_with = "as_secs")]
    pub p99: Duration,
}

impl OperationStats {
    fn from_accumulator(kind: OperationKind, mut acc: KindAccumulator) -> Self {
        acc.durations.sort_unstable();
        let sorted = &acc.durations;
        let count = sorted.len() as u64;

        let mean = if count == 0 {
            Duration::ZERO
        } else {
            nanos_to_duration(acc.total.as_nanos() / u128::from(count))
        };

        Self {
            kind,
            count,
            errors: acc.errors,
            mean,
            median: median(sorted),
            min: sorted.first().copied().unwrap_or_default(),
            max: sorted.last().copied().unwrap_or_default(),
            p95: percentile(sorted, 0.95),
            p99: percentile(sorted, 0.99),
        }
    }

    pub fn successes(&self) -> u64 {
        self.count - self.errors
    }
}

/// Run-wide statistics handed to the report renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    /// One entry per operation kind, in [`OperationKind::ALL`] order.
    pub operations: Vec<OperationStats>,
    pub total_queries: u64,
    pub total_errors: u64,
    pub errors_by_category: BTreeMap<ErrorCategory, u64>,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub queries_per_second: f64,
}

impl AggregateStats {
    pub fn operation(&self, kind: OperationKind) -> &OperationStats {
        &self.operations[kind.index()]
    }

    pub fn total_successes(&self) -> u64 {
        self.total_queries - self.total_errors
    }
}

/// Middle element for odd counts, mean of the two middle elements for even
/// counts (integer nanoseconds, truncating).
fn median(sorted: &[Duration]) -> Duration {
    let n = sorted.len();
    if n == 0 {
        return Duration::ZERO;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        let low = sorted[n / 2 - 1].as_nanos();
        let high = sorted[n / 2].as_nanos();
        nanos_to_duration((low + high) / 2)
    }
}

/// Nearest-rank percentile: `sorted[ceil(q * n) - 1]`.
fn percentile(sorted: &[Duration], q: f64) -> Duration {
    let n = sorted.len();
    if n == 0 {
        return Duration::ZERO;
    }
    let rank = (q * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[]), Duration::ZERO);
        assert_eq!(median(&[ms(5)]), ms(5));
        assert_eq!(median(&[ms(1), ms(2), ms(9)]), ms(2));
        assert_eq!(median(&[ms(1), ms(2), ms(4), ms(9)]), ms(3));
        assert_eq!(
            median(&[Duration::from_nanos(1), Duration::from_nanos(2)]),
            Duration::from_nanos(1)
        );
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let sorted: Vec<Duration> = (1..=100).map(ms).collect();
        assert_eq!(percentile(&sorted, 0.95), ms(95));
        assert_eq!(percentile(&sorted, 0.99), ms(99));
        assert_eq!(percentile(&[ms(7)], 0.99), ms(7));
        assert_eq!(percentile(&[], 0.5), Duration::ZERO);
    }

    #[test]
    fn test_record_and_finish() {
        let aggregator = MetricsAggregator::new();
        aggregator.record(Sample::success(OperationKind::Read, ms(10)));
        aggregator.record(Sample::success(OperationKind::Read, ms(30)));
        aggregator.record(Sample::failure(
            OperationKind::Update,
            ms(5),
            ErrorCategory::LockConflict,
        ));

        let stats = aggregator.finish(Duration::from_secs(2));
        let read = stats.operation(OperationKind::Read);
        assert_eq!(read.count, 2);
        assert_eq!(read.errors, 0);
        assert_eq!(read.mean, ms(20));
        assert_eq!(read.median, ms(20));
        assert_eq!(read.min, ms(10));
        assert_eq!(read.max, ms(30));

        let update = stats.operation(OperationKind::Update);
        assert_eq!(update.count, 1);
        assert_eq!(update.errors, 1);
        assert_eq!(update.mean, ms(5));

        assert_eq!(stats.operation(OperationKind::Insert).count, 0);
        assert_eq!(stats.total_queries, 3);
        assert_eq!(stats.total_errors, 1);
        assert_eq!(stats.total_successes(), 2);
        assert_eq!(
            stats.errors_by_category.get(&ErrorCategory::LockConflict),
            Some(&1)
        );
        assert!((stats.queries_per_second - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats() {
        let stats = MetricsAggregator::new().finish(Duration::from_secs(1));
        assert_eq!(stats.total_queries, 0);
        assert_eq!(stats.queries_per_second, 0.0);
        for op in &stats.operations {
            assert_eq!(op.count, 0);
            assert_eq!(op.mean, Duration::ZERO);
            assert_eq!(op.median, Duration::ZERO);
        }
    }

    #[test]
    fn test_queries_per_second_zero_duration() {
        assert_eq!(queries_per_second(10, Duration::ZERO), 0.0);
        assert_eq!(queries_per_second(0, Duration::from_secs(1)), 0.0);
        assert!(queries_per_second(10, Duration::from_millis(500)) > 0.0);
    }

    #[test]
    fn test_order_independent() {
        let samples: Vec<Sample> = (0..60u64)
            .map(|i| {
                let kind = OperationKind::ALL[(i % 3) as usize];
                if i % 7 == 0 {
                    Sample::failure(kind, ms(i * 3 % 17), ErrorCategory::Server)
                } else {
                    Sample::success(kind, ms(i * 5 % 23))
                }
            })
            .collect();

        let forward = MetricsAggregator::new();
        samples.iter().for_each(|s| forward.record(*s));

        let reverse = MetricsAggregator::new();
        samples.iter().rev().for_each(|s| reverse.record(*s));

        let elapsed = Duration::from_secs(3);
        assert_eq!(forward.finish(elapsed), reverse.finish(elapsed));
    }

    #[test]
    fn test_concurrent_record_loses_nothing() {
        let aggregator = Arc::new(MetricsAggregator::with_capacity(8 * 1_000));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let aggregator = Arc::clone(&aggregator);
                std::thread::spawn(move || {
                    for i in 0..1_000u64 {
                        let kind = OperationKind::ALL[((t + i) % 3) as usize];
                        aggregator.record(Sample::success(kind, Duration::from_micros(i)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(aggregator.sample_count(), 8_000);
        let stats = aggregator.snapshot(Duration::from_secs(1));
        let per_kind: u64 = stats.operations.iter().map(|o| o.count).sum();
        assert_eq!(per_kind, 8_000);
        assert_eq!(stats.total_queries, 8_000);
    }

    #[test]
    fn test_huge_capacity_hint_is_capped() {
        let aggregator = MetricsAggregator::with_capacity(usize::MAX);
        {
            let state = aggregator.state.lock().unwrap();
            for acc in &state.kinds {
                assert!(acc.durations.capacity() <= MAX_RESERVED_SAMPLES);
            }
        }
        aggregator.record(Sample::success(OperationKind::Read, ms(1)));
        assert_eq!(aggregator.sample_count(), 1);
    }

    #[test]
    fn test_stats_serialize_durations_as_seconds() {
        let aggregator = MetricsAggregator::new();
        aggregator.record(Sample::success(OperationKind::Insert, ms(250)));
        let stats = aggregator.finish(Duration::from_secs(1));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["elapsed_secs"], 1.0);
        assert_eq!(json["operations"][1]["kind"], "insert");
        assert_eq!(json["operations"][1]["median"], 0.25);
    }
}
