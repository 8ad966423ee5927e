//! Metrics collector - thread-safe aggregation with latency tracking.

use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::invoke::{InvocationResult, Outcome};

use super::types::{CheckStat, RunMetrics};

/// Clone-shareable collector; every virtual user records into the same
/// underlying state. Write sections are kept short so concurrent writers
/// contend minimally.
#[derive(Clone)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<RunMetrics>>,
    latencies: Arc<RwLock<Histogram<u64>>>,
    system: Arc<RwLock<System>>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        // 3 significant digits of latency precision
        let latencies = Histogram::new(3).expect("failed to create latency histogram");

        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );

        Self {
            metrics: Arc::new(RwLock::new(RunMetrics::default())),
            latencies: Arc::new(RwLock::new(latencies)),
            system: Arc::new(RwLock::new(system)),
            start_time: Instant::now(),
        }
    }

    /// Register the check names whose outcomes will accompany each
    /// result, fixing their order for the whole run.
    pub fn register_checks(&self, names: &[String]) {
        let mut metrics = self.metrics.write();
        metrics.checks = names
            .iter()
            .map(|name| CheckStat {
                name: name.clone(),
                ..Default::default()
            })
            .collect();
    }

    /// Count an iteration that has started an invocation attempt.
    pub fn invocation_started(&self) {
        self.metrics.write().invocations.attempted += 1;
    }

    /// Record one result together with its check outcomes (aligned with
    /// the registered check order).
    pub fn record(&self, result: &InvocationResult, check_outcomes: &[bool]) {
        let mut metrics = self.metrics.write();
        metrics.invocations.recorded += 1;
        match &result.outcome {
            Outcome::Status(code) => {
                *metrics
                    .invocations
                    .statuses
                    .entry(format!("{code:?}"))
                    .or_insert(0) += 1;
            }
            Outcome::ConnectFailed(_) => metrics.invocations.connect_failed += 1,
            Outcome::EncodeError(_) => metrics.invocations.encode_errors += 1,
            Outcome::TransportError(_) => metrics.invocations.transport_errors += 1,
            Outcome::Aborted => metrics.invocations.aborted += 1,
        }
        for (stat, passed) in metrics.checks.iter_mut().zip(check_outcomes) {
            stat.total += 1;
            if *passed {
                stat.passed += 1;
            }
        }
        drop(metrics);

        if result.outcome.has_call_latency() {
            let mut latencies = self.latencies.write();
            let _ = latencies.record(result.latency.as_millis() as u64);
        }
    }

    /// Record `n` forced terminations. Used by the scheduler for calls
    /// still in flight when the grace window expires; keeps
    /// `recorded == attempted` for aborted runs.
    pub fn record_aborted(&self, n: u64) {
        let mut metrics = self.metrics.write();
        metrics.invocations.recorded += n;
        metrics.invocations.aborted += n;
    }

    /// Attempts whose results have not been recorded yet.
    pub fn outstanding(&self) -> u64 {
        let metrics = self.metrics.read();
        metrics
            .invocations
            .attempted
            .saturating_sub(metrics.invocations.recorded)
    }

    /// Update system metrics (CPU, memory)
    pub fn update_system_metrics(&self) {
        let mut system = self.system.write();
        system.refresh_cpu_all();
        system.refresh_memory();

        let mut metrics = self.metrics.write();
        metrics.system.cpu_usage = system.global_cpu_usage();
        metrics.system.memory_used_mb = system.used_memory() / 1024 / 1024;
        metrics.system.memory_total_mb = system.total_memory() / 1024 / 1024;
    }

    pub fn snapshot(&self) -> RunMetrics {
        self.metrics.read().clone()
    }

    /// Latency value at `quantile`, or `None` before any call completed.
    /// Computed from the recorded histogram, so repeated evaluation over
    /// the same latency set yields the same value.
    pub fn latency_quantile_ms(&self, quantile: f64) -> Option<u64> {
        let latencies = self.latencies.read();
        if latencies.is_empty() {
            None
        } else {
            Some(latencies.value_at_quantile(quantile))
        }
    }

    pub fn latency_stats(&self) -> LatencyStats {
        let latencies = self.latencies.read();
        LatencyStats {
            min: latencies.min(),
            p50: latencies.value_at_quantile(0.50),
            p95: latencies.value_at_quantile(0.95),
            p99: latencies.value_at_quantile(0.99),
            max: latencies.max(),
            mean: latencies.mean(),
            count: latencies.len(),
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct LatencyStats {
    pub min: u64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub max: u64,
    pub mean: f64,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tonic::Code;

    fn reply(code: Code, ms: u64) -> InvocationResult {
        InvocationResult::new(Outcome::Status(code), Duration::from_millis(ms))
    }

    #[test]
    fn percentile_is_deterministic_for_fixed_input() {
        let collector = MetricsCollector::new();
        for ms in (10..=1000).step_by(10) {
            collector.record(&reply(Code::Ok, ms), &[]);
        }
        let first = collector.latency_quantile_ms(0.95).unwrap();
        let second = collector.latency_quantile_ms(0.95).unwrap();
        assert_eq!(first, 950);
        assert_eq!(first, second);
    }

    #[test]
    fn every_result_is_accounted_exactly_once() {
        let collector = MetricsCollector::new();
        collector.invocation_started();
        collector.invocation_started();
        collector.invocation_started();
        collector.record(&reply(Code::Ok, 5), &[]);
        collector.record(
            &InvocationResult::new(Outcome::ConnectFailed("refused".into()), Duration::ZERO),
            &[],
        );
        assert_eq!(collector.outstanding(), 1);
        collector.record_aborted(collector.outstanding());

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.invocations.attempted, 3);
        assert_eq!(snapshot.invocations.recorded, 3);
        assert_eq!(snapshot.invocations.aborted, 1);
        assert_eq!(snapshot.invocations.connect_failed, 1);
        assert_eq!(snapshot.invocations.replies(), 1);
    }

    #[test]
    fn failed_calls_still_count_latency() {
        let collector = MetricsCollector::new();
        collector.record(
            &InvocationResult::new(
                Outcome::TransportError("deadline".into()),
                Duration::from_millis(200),
            ),
            &[],
        );
        assert_eq!(collector.latency_stats().count, 1);
    }

    #[test]
    fn check_outcomes_aggregate_by_registration_order() {
        let collector = MetricsCollector::new();
        collector.register_checks(&["a".into(), "b".into()]);
        collector.record(&reply(Code::Ok, 5), &[true, false]);
        collector.record(&reply(Code::Ok, 5), &[true, true]);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.checks[0].passed, 2);
        assert_eq!(snapshot.checks[1].passed, 1);
        assert_eq!(snapshot.checks[1].total, 2);
        assert!((snapshot.checks[1].rate() - 0.5).abs() < f64::EPSILON);
    }
}
