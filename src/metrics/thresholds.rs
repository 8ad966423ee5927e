//! Run-end threshold evaluation.
//!
//! A threshold is a named rule over one aggregated metric, evaluated once
//! at run end. A violated threshold marks the run failed; it never aborts
//! a run in progress.

use super::collector::MetricsCollector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn holds(self, observed: f64, limit: f64) -> bool {
        match self {
            Comparison::Lt => observed < limit,
            Comparison::Le => observed <= limit,
            Comparison::Gt => observed > limit,
            Comparison::Ge => observed >= limit,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

/// The aggregated metric a threshold constrains.
#[derive(Debug, Clone)]
pub enum Metric {
    /// Latency value at a quantile, in milliseconds.
    LatencyQuantile(f64),
    /// Overall check pass rate, all checks pooled (0.0 to 1.0).
    CheckRate,
    /// Share of results that produced no gRPC reply (0.0 to 1.0).
    ErrorRate,
}

#[derive(Debug, Clone)]
pub struct Threshold {
    pub name: String,
    pub metric: Metric,
    pub comparison: Comparison,
    pub limit: f64,
}

impl Threshold {
    pub fn new(metric: Metric, comparison: Comparison, limit: f64) -> Self {
        let name = match &metric {
            Metric::LatencyQuantile(q) => {
                format!("latency p({}){}{}ms", q * 100.0, comparison.symbol(), limit)
            }
            Metric::CheckRate => format!("checks rate{}{}", comparison.symbol(), limit),
            Metric::ErrorRate => format!("error rate{}{}", comparison.symbol(), limit),
        };
        Self {
            name,
            metric,
            comparison,
            limit,
        }
    }

    /// Convenience for the common `p(q) < limit` latency rule.
    pub fn latency_quantile_under(quantile: f64, limit_ms: f64) -> Self {
        Self::new(Metric::LatencyQuantile(quantile), Comparison::Lt, limit_ms)
    }

    /// Convenience for the common `rate > limit` check rule.
    pub fn check_rate_over(limit: f64) -> Self {
        Self::new(Metric::CheckRate, Comparison::Gt, limit)
    }

    fn observe(&self, collector: &MetricsCollector) -> Option<f64> {
        match &self.metric {
            Metric::LatencyQuantile(q) => {
                collector.latency_quantile_ms(*q).map(|ms| ms as f64)
            }
            Metric::CheckRate => {
                let snapshot = collector.snapshot();
                let total: u64 = snapshot.checks.iter().map(|c| c.total).sum();
                if total == 0 {
                    return None;
                }
                let passed: u64 = snapshot.checks.iter().map(|c| c.passed).sum();
                Some(passed as f64 / total as f64)
            }
            Metric::ErrorRate => {
                let snapshot = collector.snapshot();
                if snapshot.invocations.recorded == 0 {
                    return None;
                }
                Some(snapshot.invocations.errors() as f64 / snapshot.invocations.recorded as f64)
            }
        }
    }

    /// Evaluate against the collected metrics. A metric with no samples
    /// passes: an empty run has violated nothing.
    pub fn evaluate(&self, collector: &MetricsCollector) -> ThresholdOutcome {
        let observed = self.observe(collector);
        let passed = match observed {
            Some(value) => self.comparison.holds(value, self.limit),
            None => true,
        };
        ThresholdOutcome {
            name: self.name.clone(),
            observed,
            passed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdOutcome {
    pub name: String,
    pub observed: Option<f64>,
    pub passed: bool,
}

/// Evaluate all thresholds; the run passes only if every one holds.
pub fn evaluate_all(
    thresholds: &[Threshold],
    collector: &MetricsCollector,
) -> (Vec<ThresholdOutcome>, bool) {
    let outcomes: Vec<ThresholdOutcome> =
        thresholds.iter().map(|t| t.evaluate(collector)).collect();
    let passed = outcomes.iter().all(|o| o.passed);
    (outcomes, passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::{InvocationResult, Outcome};
    use std::time::Duration;
    use tonic::Code;

    fn collector_with_latencies(latencies_ms: &[u64]) -> MetricsCollector {
        let collector = MetricsCollector::new();
        for &ms in latencies_ms {
            collector.record(
                &InvocationResult::new(Outcome::Status(Code::Ok), Duration::from_millis(ms)),
                &[],
            );
        }
        collector
    }

    #[test]
    fn latency_threshold_fails_when_quantile_exceeds_limit() {
        let collector = collector_with_latencies(&[100, 200, 1500]);
        let outcome = Threshold::latency_quantile_under(0.95, 1000.0).evaluate(&collector);
        assert!(!outcome.passed);
        assert_eq!(outcome.observed, Some(1500.0));
    }

    #[test]
    fn latency_threshold_passes_under_limit() {
        let collector = collector_with_latencies(&[100, 200, 300]);
        let outcome = Threshold::latency_quantile_under(0.95, 1000.0).evaluate(&collector);
        assert!(outcome.passed);
    }

    #[test]
    fn empty_run_passes_every_threshold() {
        let collector = MetricsCollector::new();
        collector.register_checks(&["status OK".into()]);
        let thresholds = vec![
            Threshold::latency_quantile_under(0.95, 1000.0),
            Threshold::check_rate_over(0.98),
            Threshold::new(Metric::ErrorRate, Comparison::Lt, 0.01),
        ];
        let (outcomes, passed) = evaluate_all(&thresholds, &collector);
        assert!(passed);
        assert!(outcomes.iter().all(|o| o.observed.is_none()));
    }

    #[test]
    fn check_rate_threshold_pools_all_checks() {
        let collector = MetricsCollector::new();
        collector.register_checks(&["a".into(), "b".into()]);
        let ok = InvocationResult::new(Outcome::Status(Code::Ok), Duration::from_millis(1));
        collector.record(&ok, &[true, true]);
        collector.record(&ok, &[true, false]);

        let outcome = Threshold::check_rate_over(0.98).evaluate(&collector);
        assert_eq!(outcome.observed, Some(0.75));
        assert!(!outcome.passed);
    }

    #[test]
    fn error_rate_counts_non_reply_outcomes() {
        let collector = MetricsCollector::new();
        collector.record(
            &InvocationResult::new(Outcome::Status(Code::Ok), Duration::from_millis(1)),
            &[],
        );
        collector.record(
            &InvocationResult::new(Outcome::TransportError("reset".into()), Duration::ZERO),
            &[],
        );
        let outcome = Threshold::new(Metric::ErrorRate, Comparison::Le, 0.5).evaluate(&collector);
        assert_eq!(outcome.observed, Some(0.5));
        assert!(outcome.passed);
    }
}
