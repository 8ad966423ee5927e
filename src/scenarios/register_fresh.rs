//! Fresh-registration scenario - a new tenant id on every iteration.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::checks;
use crate::cli::{CommonArgs, RegisterFreshArgs};
use crate::config::{ConnectionPolicy, Pacing, RunConfig, Scenario};
use crate::engine::RunSummary;
use crate::payload::{FieldValue, PayloadSchema, RequestTemplate};

pub async fn run(common: CommonArgs, args: RegisterFreshArgs) -> Result<RunSummary> {
    info!("Starting register-fresh scenario");

    let template = RequestTemplate::new()
        .set("id", FieldValue::GeneratedUuid)
        .set("name", FieldValue::Str(args.tenant_name.clone()))
        .set("region", FieldValue::Str(args.region.clone()))
        .set("owner_id", FieldValue::Str(args.owner_id.clone()))
        .set("owner_type", FieldValue::Str(args.owner_type.clone()))
        .set("role", FieldValue::Enum(args.role));

    let scenario = Scenario {
        vus: args.vus,
        bound: super::bound_from(args.iterations, args.duration),
        warmup: Duration::ZERO,
        pacing: Pacing::Fixed(Duration::from_millis(args.pacing_ms)),
        graceful_stop: Duration::from_secs(args.graceful_stop),
        // Connect, register, close on every iteration.
        connection_policy: ConnectionPolicy::PerIteration,
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

    let checks = vec![checks::status_ok()];

    super::execute(config, checks, Vec::new()).await
}
