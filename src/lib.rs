//! gRPC load-generation core for the tenant registry service.
//!
//! Replaces the external load-testing harness the registry's load scripts
//! used to depend on: a connection pool, a virtual-user scheduler, a
//! dynamic invocation engine, and a metrics/threshold evaluator, plus the
//! two scenario presets the registry is exercised under.

pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod invoke;
pub mod metrics;
pub mod payload;
pub mod scenarios;
pub mod transport;

pub use engine::{Engine, RunState, RunSummary};
pub use error::{ConnectError, EncodeError, LoadgenError, LoadgenResult};
pub use invoke::{InvocationResult, Invoker, Outcome};
