//! Metrics collection, threshold evaluation, and console reporting.

pub mod collector;
pub mod reporter;
pub mod thresholds;
pub mod types;

pub use collector::{LatencyStats, MetricsCollector};
pub use thresholds::{Comparison, Metric, Threshold, ThresholdOutcome};
pub use types::{CheckStat, InvocationCounters, RunMetrics, SystemMetrics};
