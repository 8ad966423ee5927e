//! Scenario presets.
//!
//! Each preset assembles a [`RunConfig`], a check set, and thresholds,
//! then hands everything to the shared engine wiring. The two presets
//! mirror the workload shapes the registry service is tested under: fresh
//! registrations and a same-key burst.

pub mod register_fresh;
pub mod same_tenant_burst;

use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::checks::Check;
use crate::cli::CommonArgs;
use crate::config::{RunBound, RunConfig, Target, TlsOptions};
use crate::engine::{Engine, RunSummary};
use crate::invoke::GrpcInvoker;
use crate::metrics::reporter;
use crate::metrics::Threshold;
use crate::transport::{self, ChannelConnector, ConnectionPool};

fn target_from(common: &CommonArgs) -> Target {
    let tls = common.use_tls.then(|| TlsOptions {
        ca_file: common.ca_file.clone(),
        cert_file: common.cert_file.clone(),
        key_file: common.key_file.clone(),
        domain_override: common.tls_domain.clone(),
        insecure_skip_verify: common.insecure_skip_verify,
    });
    Target {
        authority: common.target.clone(),
        tls,
        connect_timeout: Duration::from_secs(common.connect_timeout),
    }
}

fn bound_from(iterations: Option<u64>, duration_secs: u64) -> RunBound {
    match iterations {
        Some(n) => RunBound::Iterations(n),
        None => RunBound::Duration(Duration::from_secs(duration_secs)),
    }
}

/// Wire a configured run to the gRPC transport and drive it to
/// completion, with live reporting and Ctrl+C handling.
pub async fn execute(
    config: RunConfig,
    checks: Vec<Check>,
    thresholds: Vec<Threshold>,
) -> Result<RunSummary> {
    let endpoint = transport::build_endpoint(&config.target)?;
    let connector = ChannelConnector::new(endpoint, config.target.authority.clone());
    let pool = ConnectionPool::new(connector, config.scenario.connection_policy);
    let invoker = GrpcInvoker::new(&config.method, config.scenario.call_timeout)?;
    let report_interval = config.report_interval;

    let engine = Engine::new(config, pool, invoker, checks, thresholds);

    // Ctrl+C cancels the run; in-flight calls drain inside the grace window.
    let cancel = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping run");
            cancel.cancel();
        }
    });

    // The live reporter outlives run cancellation so the drain phase
    // stays visible; it stops only once the summary is in.
    let collector = engine.collector().clone();
    let reporter_cancel = CancellationToken::new();
    {
        let collector = collector.clone();
        let reporter_cancel = reporter_cancel.clone();
        tokio::spawn(async move {
            reporter::start_periodic_reporter(collector, report_interval, reporter_cancel).await;
        });
    }

    let summary = engine.run().await;
    reporter_cancel.cancel();

    reporter::print_final_report(&collector, &summary.thresholds);
    Ok(summary)
}
