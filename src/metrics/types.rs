//! Metric types.

use std::collections::HashMap;

/// Per-run invocation accounting. `attempted` counts iterations that
/// started; `recorded` counts results the aggregator has seen. The two
/// are equal once a run completes, aborted runs included.
#[derive(Debug, Clone, Default)]
pub struct InvocationCounters {
    pub attempted: u64,
    pub recorded: u64,
    /// Replies by gRPC status code name, OK included.
    pub statuses: HashMap<String, u64>,
    pub connect_failed: u64,
    pub encode_errors: u64,
    pub transport_errors: u64,
    pub aborted: u64,
}

impl InvocationCounters {
    /// Results that never produced a gRPC reply.
    pub fn errors(&self) -> u64 {
        self.connect_failed + self.encode_errors + self.transport_errors + self.aborted
    }

    pub fn replies(&self) -> u64 {
        self.statuses.values().sum()
    }
}

/// Aggregated pass/fail tally for one named check.
#[derive(Debug, Clone, Default)]
pub struct CheckStat {
    pub name: String,
    pub passed: u64,
    pub total: u64,
}

impl CheckStat {
    /// Pass rate; a check that never ran counts as passing so that empty
    /// runs cannot fail on division by zero.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemMetrics {
    pub cpu_usage: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    pub invocations: InvocationCounters,
    pub checks: Vec<CheckStat>,
    pub system: SystemMetrics,
}
