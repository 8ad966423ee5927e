//! Virtual-user scheduler and run lifecycle.
//!
//! A run spawns one task per virtual user, each looping through
//! acquire → build → invoke → record → pace until the configured bound is
//! reached or the run-level cancellation token fires. Cancellation opens a
//! bounded drain window: in-flight calls may finish and be recorded with
//! their real outcome; calls still running when the window closes are
//! forced down and recorded as aborted, so no attempt ever goes
//! unaccounted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::checks::{self, Check};
use crate::config::{RunBound, RunConfig};
use crate::invoke::{InvocationResult, Invoker, Outcome};
use crate::metrics::collector::LatencyStats;
use crate::metrics::thresholds::{self, Threshold, ThresholdOutcome};
use crate::metrics::{MetricsCollector, RunMetrics};
use crate::transport::{Connect, ConnectionPool};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running,
    Draining,
    Completed { thresholds_passed: bool },
}

/// Final state of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub metrics: RunMetrics,
    pub latency: LatencyStats,
    pub thresholds: Vec<ThresholdOutcome>,
    pub thresholds_passed: bool,
    pub elapsed: Duration,
}

/// The load-generation engine for one run.
pub struct Engine<C, I>
where
    C: Connect,
    I: Invoker<Conn = C::Conn>,
{
    config: Arc<RunConfig>,
    pool: Arc<ConnectionPool<C>>,
    invoker: Arc<I>,
    checks: Arc<Vec<Check>>,
    thresholds: Vec<Threshold>,
    collector: MetricsCollector,
    cancel: CancellationToken,
    state_tx: watch::Sender<RunState>,
}

impl<C, I> Engine<C, I>
where
    C: Connect,
    I: Invoker<Conn = C::Conn>,
{
    pub fn new(
        config: RunConfig,
        pool: ConnectionPool<C>,
        invoker: I,
        checks: Vec<Check>,
        thresholds: Vec<Threshold>,
    ) -> Self {
        let collector = MetricsCollector::new();
        let names: Vec<String> = checks.iter().map(|c| c.name().to_string()).collect();
        collector.register_checks(&names);
        let (state_tx, _) = watch::channel(RunState::Pending);

        Self {
            config: Arc::new(config),
            pool: Arc::new(pool),
            invoker: Arc::new(invoker),
            checks: Arc::new(checks),
            thresholds,
            collector,
            cancel: CancellationToken::new(),
            state_tx,
        }
    }

    /// Token that cancels the whole run; external stop signals hook in
    /// here.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state_rx(&self) -> watch::Receiver<RunState> {
        self.state_tx.subscribe()
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }

    /// Execute the run to completion and evaluate thresholds.
    pub async fn run(self) -> RunSummary {
        let scenario = &self.config.scenario;
        let run_started = Instant::now();

        if !scenario.warmup.is_zero() {
            info!(warmup_ms = scenario.warmup.as_millis() as u64, "warming up");
            sleep(scenario.warmup).await;
        }

        // A zero-duration bound must never start an iteration; cancel
        // before the first task is spawned.
        if let RunBound::Duration(d) = scenario.effective_bound() {
            if d.is_zero() {
                self.cancel.cancel();
            }
        }

        let _ = self.state_tx.send(RunState::Running);
        info!(vus = scenario.vus, "starting virtual users");

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(scenario.vus);
        for vu in 0..scenario.vus {
            handles.push(tokio::spawn(vu_loop(
                vu,
                Arc::clone(&self.config),
                Arc::clone(&self.pool),
                Arc::clone(&self.invoker),
                Arc::clone(&self.checks),
                self.collector.clone(),
                self.cancel.clone(),
            )));
        }

        if let RunBound::Duration(d) = scenario.effective_bound() {
            if !d.is_zero() {
                tokio::select! {
                    _ = sleep(d) => info!("run duration elapsed"),
                    _ = self.cancel.cancelled() => info!("run cancelled"),
                }
                self.cancel.cancel();
            }
        }

        let _ = self.state_tx.send(RunState::Draining);
        let grace = scenario.graceful_stop;
        let mut drain_deadline = self
            .cancel
            .is_cancelled()
            .then(|| Instant::now() + grace);

        for mut handle in handles {
            loop {
                match drain_deadline {
                    Some(deadline) => {
                        let joined = timeout_at(deadline, &mut handle).await;
                        match joined {
                            Ok(res) => {
                                if let Err(e) = res {
                                    error!(error = %e, "virtual user task panicked");
                                }
                            }
                            Err(_) => {
                                handle.abort();
                                let _ = handle.await;
                            }
                        }
                        break;
                    }
                    None => {
                        tokio::select! {
                            res = &mut handle => {
                                if let Err(e) = res {
                                    error!(error = %e, "virtual user task panicked");
                                }
                                break;
                            }
                            _ = self.cancel.cancelled() => {
                                drain_deadline = Some(Instant::now() + grace);
                            }
                        }
                    }
                }
            }
        }

        // Whatever was attempted but never recorded was forced down
        // inside the grace window.
        let forced = self.collector.outstanding();
        if forced > 0 {
            info!(forced, "recording forced terminations as aborted");
            self.collector.record_aborted(forced);
        }

        let (threshold_outcomes, thresholds_passed) =
            thresholds::evaluate_all(&self.thresholds, &self.collector);
        let _ = self.state_tx.send(RunState::Completed { thresholds_passed });

        RunSummary {
            metrics: self.collector.snapshot(),
            latency: self.collector.latency_stats(),
            thresholds: threshold_outcomes,
            thresholds_passed,
            elapsed: run_started.elapsed(),
        }
    }
}

/// One virtual user's iteration loop.
async fn vu_loop<C, I>(
    vu: usize,
    config: Arc<RunConfig>,
    pool: Arc<ConnectionPool<C>>,
    invoker: Arc<I>,
    checks: Arc<Vec<Check>>,
    collector: MetricsCollector,
    cancel: CancellationToken,
) where
    C: Connect,
    I: Invoker<Conn = C::Conn>,
{
    let bound = config.scenario.effective_bound();
    let mut iterations: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            break;
        }
        if let RunBound::Iterations(max) = bound {
            if iterations >= max {
                break;
            }
        }
        iterations += 1;
        collector.invocation_started();

        let started = std::time::Instant::now();
        let mut conn = match pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                debug!(vu, error = %e, "connection acquisition failed");
                let result =
                    InvocationResult::new(Outcome::ConnectFailed(e.to_string()), started.elapsed());
                let outcomes = checks::evaluate_all(&checks, &result);
                collector.record(&result, &outcomes);
                pace(&config, &cancel).await;
                continue;
            }
        };

        let result = match config.template.build(&config.schema) {
            Ok(payload) => invoker.invoke(&mut conn, payload).await,
            // Nothing was sent; the failure is still a recorded result.
            Err(e) => InvocationResult::new(Outcome::EncodeError(e.to_string()), Duration::ZERO),
        };
        let outcomes = checks::evaluate_all(&checks, &result);
        collector.record(&result, &outcomes);
        pool.release(conn);

        pace(&config, &cancel).await;
    }

    debug!(vu, iterations, "virtual user finished");
}

/// Sleep out the pacing delay, cut short by cancellation.
async fn pace(config: &RunConfig, cancel: &CancellationToken) {
    if let Some(delay) = config.scenario.pacing.next_delay() {
        tokio::select! {
            _ = sleep(delay) => {}
            _ = cancel.cancelled() => {}
        }
    }
}
