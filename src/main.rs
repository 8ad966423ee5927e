use anyhow::Result;
use clap::Parser;

use registry_loadgen::cli::{Cli, ScenarioCmd};
use registry_loadgen::scenarios;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.common.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("Registry Load Test Starting...");
    tracing::info!("Target: {}", cli.common.target);
    tracing::info!("Method: {}", cli.common.method);
    tracing::info!("TLS: {}", cli.common.use_tls);

    // Run the selected scenario
    let summary = match cli.scenario.clone() {
        ScenarioCmd::RegisterFresh(args) => {
            tracing::info!("Running Register Fresh scenario");
            tracing::info!("  VUs: {}", args.vus);
            tracing::info!("  Duration: {}s", args.duration);
            scenarios::register_fresh::run(cli.common, args).await?
        }
        ScenarioCmd::SameTenantBurst(args) => {
            tracing::info!("Running Same Tenant Burst scenario");
            tracing::info!("  VUs: {}", args.vus);
            tracing::info!("  Duration: {}s", args.duration);
            tracing::info!("  Graceful Stop: {}s", args.graceful_stop);
            scenarios::same_tenant_burst::run(cli.common, args).await?
        }
    };

    tracing::info!("Load test complete");

    if !summary.thresholds_passed {
        tracing::error!("one or more thresholds failed");
        std::process::exit(1);
    }

    Ok(())
}
