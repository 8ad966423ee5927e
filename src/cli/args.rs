use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Registry Load Testing Tool
#[derive(Parser, Debug)]
#[command(name = "registry-loadgen")]
#[command(about = "gRPC load generator for the tenant registry service")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub scenario: ScenarioCmd,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Registry service host:port
    #[arg(long, default_value = "localhost:9092", env = "TARGET")]
    pub target: String,

    /// Connect over TLS instead of plaintext
    #[arg(long, env = "USE_TLS")]
    pub use_tls: bool,

    /// CA certificate for server verification (PEM)
    #[arg(long, env = "CA_FILE")]
    pub ca_file: Option<PathBuf>,

    /// Client certificate for mutual TLS (PEM)
    #[arg(long, env = "CERT_FILE")]
    pub cert_file: Option<PathBuf>,

    /// Private key matching --cert-file (PEM)
    #[arg(long, env = "KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Relax server verification to platform trust roots
    #[arg(long, env = "INSECURE_SKIP_VERIFY")]
    pub insecure_skip_verify: bool,

    /// Override the domain name used for certificate verification
    #[arg(long)]
    pub tls_domain: Option<String>,

    /// Fully qualified gRPC method to invoke
    #[arg(
        long,
        default_value = "kms.api.cmk.registry.tenant.v1.Service/RegisterTenant",
        env = "METHOD"
    )]
    pub method: String,

    /// Per-call timeout in seconds
    #[arg(long, default_value = "10")]
    pub call_timeout: u64,

    /// Connection establishment timeout in seconds
    #[arg(long, default_value = "10")]
    pub connect_timeout: u64,

    /// Metrics reporting interval in seconds
    #[arg(long, default_value = "5")]
    pub report_interval: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScenarioCmd {
    /// Register a freshly generated tenant on every iteration
    RegisterFresh(RegisterFreshArgs),

    /// Submit one fixed tenant id from many users to exercise
    /// server-side conflict detection
    SameTenantBurst(SameTenantBurstArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RegisterFreshArgs {
    /// Number of virtual users
    #[arg(long, default_value = "30", env = "VUS")]
    pub vus: usize,

    /// Test duration in seconds
    #[arg(long, default_value = "10", env = "DURATION")]
    pub duration: u64,

    /// Iterations per virtual user; overrides --duration when set
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Pacing between iterations in milliseconds
    #[arg(long, default_value = "1000")]
    pub pacing_ms: u64,

    /// Graceful-stop window in seconds
    #[arg(long, default_value = "30", env = "GRACEFUL_STOP")]
    pub graceful_stop: u64,

    /// Tenant display name
    #[arg(long, default_value = "SuccessFactor2", env = "TENANT_NAME")]
    pub tenant_name: String,

    /// Tenant region
    #[arg(long, default_value = "emea", env = "REGION")]
    pub region: String,

    #[arg(long, default_value = "owner123", env = "OWNER_ID")]
    pub owner_id: String,

    #[arg(long, default_value = "owner_type", env = "OWNER_TYPE")]
    pub owner_type: String,

    /// Tenant role enum value (1 = ROLE_LIVE)
    #[arg(long, default_value = "1", env = "ROLE")]
    pub role: i32,
}

#[derive(Args, Debug, Clone)]
pub struct SameTenantBurstArgs {
    /// Number of virtual users
    #[arg(long, default_value = "120", env = "VUS")]
    pub vus: usize,

    /// Test duration in seconds
    #[arg(long, default_value = "30", env = "DURATION")]
    pub duration: u64,

    /// Iterations per virtual user; overrides --duration when set
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Pacing between iterations in milliseconds
    #[arg(long, default_value = "100")]
    pub pacing_ms: u64,

    /// Graceful-stop window in seconds
    #[arg(long, default_value = "5", env = "GRACEFUL_STOP")]
    pub graceful_stop: u64,

    /// Fixed tenant id shared by every virtual user
    #[arg(long, default_value = "race-acme-fixed-001", env = "TENANT_ID")]
    pub tenant_id: String,

    /// Tenant display name
    #[arg(long, default_value = "Acme Corp Fixed", env = "TENANT_NAME")]
    pub tenant_name: String,

    /// Tenant region
    #[arg(long, default_value = "eu10", env = "REGION")]
    pub region: String,

    #[arg(long, default_value = "load-test-owner", env = "OWNER_ID")]
    pub owner_id: String,

    #[arg(long, default_value = "load-test", env = "OWNER_TYPE")]
    pub owner_type: String,

    /// Tenant role enum value (1 = ROLE_LIVE)
    #[arg(long, default_value = "1", env = "ROLE")]
    pub role: i32,

    /// p95 latency ceiling in milliseconds
    #[arg(long, default_value = "1000")]
    pub p95_limit_ms: f64,

    /// Minimum overall check pass rate
    #[arg(long, default_value = "0.98")]
    pub check_rate: f64,
}
