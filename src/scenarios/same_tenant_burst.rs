//! Same-tenant burst scenario - many users submitting one fixed tenant id.
//!
//! Every virtual user registers the same tenant, so the server's
//! duplicate-key handling is what gets exercised: the expected outcomes
//! partition into first-time success and already-exists, while internal
//! and unknown errors fail the checks.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::checks;
use crate::cli::{CommonArgs, SameTenantBurstArgs};
use crate::config::{ConnectionPolicy, Pacing, RunConfig, Scenario};
use crate::engine::RunSummary;
use crate::metrics::Threshold;
use crate::payload::{FieldValue, PayloadSchema, RequestTemplate};

pub async fn run(common: CommonArgs, args: SameTenantBurstArgs) -> Result<RunSummary> {
    info!("Starting same-tenant-burst scenario");
    info!("  Tenant Id: {}", args.tenant_id);

    let template = RequestTemplate::new()
        .set("id", FieldValue::Str(args.tenant_id.clone()))
        .set("name", FieldValue::Str(args.tenant_name.clone()))
        .set("region", FieldValue::Str(args.region.clone()))
        .set("owner_id", FieldValue::Str(args.owner_id.clone()))
        .set("owner_type", FieldValue::Str(args.owner_type.clone()))
        .set("role", FieldValue::Enum(args.role));

    let scenario = Scenario {
        vus: args.vus,
        bound: super::bound_from(args.iterations, args.duration),
        warmup: Duration::ZERO,
        // Brief pacing so the virtual users do not align perfectly.
        pacing: Pacing::Jittered {
            base: Duration::from_millis(args.pacing_ms),
            jitter: Duration::from_millis(args.pacing_ms / 2),
        },
        graceful_stop: Duration::from_secs(args.graceful_stop),
        connection_policy: ConnectionPolicy::Reuse,
        call_timeout: Duration::from_secs(common.call_timeout),
    };

    let config = RunConfig {
        target: super::target_from(&common),
        scenario,
        method: common.method.clone(),
        schema: PayloadSchema::tenant_v1(),
        template,
        report_interval: Duration::from_secs(common.report_interval),
    };

    let checks = vec![
        checks::got_reply(),
        checks::ok_or_already_exists(),
        checks::no_internal_errors(),
        checks::no_unknown_errors(),
    ];

    let thresholds = vec![
        Threshold::latency_quantile_under(0.95, args.p95_limit_ms),
        Threshold::check_rate_over(args.check_rate),
    ];

    super::execute(config, checks, thresholds).await
}
