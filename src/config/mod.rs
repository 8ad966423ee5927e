//! Run configuration.
//!
//! Everything a run needs is assembled once, up front, into a [`RunConfig`]
//! and passed by reference to the components that use it. No component
//! reads environment variables or other ambient state directly; the CLI
//! layer is the only place where the environment is consulted.

use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;

use crate::payload::{PayloadSchema, RequestTemplate};

/// TLS material and verification options for a TLS-enabled target.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// CA certificate used to verify the server, PEM encoded.
    pub ca_file: Option<PathBuf>,
    /// Client certificate for mutual TLS, PEM encoded.
    pub cert_file: Option<PathBuf>,
    /// Private key matching `cert_file`, PEM encoded.
    pub key_file: Option<PathBuf>,
    /// Override the domain name used for server certificate verification.
    pub domain_override: Option<String>,
    /// Relax verification to platform trust roots instead of requiring a
    /// pinned CA. The rustls transport offers no full verification bypass,
    /// so this is the closest supported behavior.
    pub insecure_skip_verify: bool,
}

/// The endpoint a run is aimed at. Immutable for the run.
#[derive(Debug, Clone)]
pub struct Target {
    /// `host:port` authority, no scheme.
    pub authority: String,
    /// TLS options; `None` means plaintext.
    pub tls: Option<TlsOptions>,
    /// Per-connection establishment timeout.
    pub connect_timeout: Duration,
}

impl Target {
    pub fn plaintext(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            tls: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// What ends a run: a wall-clock duration or a per-VU iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunBound {
    /// Run until the duration elapses. A zero duration runs nothing.
    Duration(Duration),
    /// Run exactly this many iterations per virtual user. A bound of
    /// zero is normalized to one iteration.
    Iterations(u64),
}

/// Delay inserted between iterations of a virtual user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    None,
    Fixed(Duration),
    /// `base` plus a uniformly random extra in `0..=jitter`, so VUs do
    /// not align perfectly.
    Jittered { base: Duration, jitter: Duration },
}

impl Pacing {
    /// Resolve the delay for one iteration, sampling jitter if configured.
    pub fn next_delay(&self) -> Option<Duration> {
        match *self {
            Pacing::None => None,
            Pacing::Fixed(d) => (!d.is_zero()).then_some(d),
            Pacing::Jittered { base, jitter } => {
                let extra = if jitter.is_zero() {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::thread_rng().gen_range(0..=jitter.as_millis() as u64))
                };
                let total = base + extra;
                (!total.is_zero()).then_some(total)
            }
        }
    }
}

/// Whether a virtual user's connection survives across iterations.
///
/// Both shapes are real workloads (connect-then-close per registration
/// versus a held connection), so this is an explicit scenario parameter
/// rather than an inferred behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPolicy {
    /// Released connections return to the pool for reuse.
    Reuse,
    /// Released connections are dropped; every iteration reconnects.
    PerIteration,
}

/// Concurrency shape of a run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Number of concurrent virtual users. Zero is a no-op run.
    pub vus: usize,
    pub bound: RunBound,
    /// Delay before the first iteration is attempted.
    pub warmup: Duration,
    pub pacing: Pacing,
    /// How long in-flight calls may keep running after the run is
    /// cancelled before they are forced down and recorded as aborted.
    pub graceful_stop: Duration,
    pub connection_policy: ConnectionPolicy,
    /// Deadline applied to each individual call.
    pub call_timeout: Duration,
}

impl Scenario {
    /// Iteration bound with zero-normalization applied.
    pub fn effective_bound(&self) -> RunBound {
        match self.bound {
            RunBound::Iterations(0) => RunBound::Iterations(1),
            other => other,
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            vus: 1,
            bound: RunBound::Duration(Duration::from_secs(10)),
            warmup: Duration::ZERO,
            pacing: Pacing::None,
            graceful_stop: Duration::from_secs(30),
            connection_policy: ConnectionPolicy::Reuse,
            call_timeout: Duration::from_secs(10),
        }
    }
}

/// Full configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: Target,
    pub scenario: Scenario,
    /// Fully qualified gRPC method path, e.g.
    /// `kms.api.cmk.registry.tenant.v1.Service/RegisterTenant`. The
    /// method is opaque configuration; no schema is compiled in.
    pub method: String,
    pub schema: PayloadSchema,
    pub template: RequestTemplate,
    /// Cadence of the live console report.
    pub report_interval: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_iteration_bound_normalizes_to_one() {
        let scenario = Scenario {
            bound: RunBound::Iterations(0),
            ..Scenario::default()
        };
        assert_eq!(scenario.effective_bound(), RunBound::Iterations(1));
    }

    #[test]
    fn jittered_pacing_stays_within_bounds() {
        let pacing = Pacing::Jittered {
            base: Duration::from_millis(100),
            jitter: Duration::from_millis(50),
        };
        for _ in 0..100 {
            let delay = pacing.next_delay().expect("non-zero base always paces");
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn zero_pacing_is_none() {
        assert_eq!(Pacing::None.next_delay(), None);
        assert_eq!(Pacing::Fixed(Duration::ZERO).next_delay(), None);
    }
}
