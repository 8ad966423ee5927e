//! Named per-result check predicates.
//!
//! A check is a boolean predicate evaluated against every invocation
//! result and aggregated into a pass rate. The built-in set covers the
//! assertions the tenant registry is load-tested with.

use std::sync::Arc;

use tonic::Code;

use crate::invoke::InvocationResult;

/// A named boolean predicate over an invocation result.
#[derive(Clone)]
pub struct Check {
    name: String,
    predicate: Arc<dyn Fn(&InvocationResult) -> bool + Send + Sync>,
}

impl Check {
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&InvocationResult) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, result: &InvocationResult) -> bool {
        (self.predicate)(result)
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}

/// Evaluate every check against one result, in registration order.
pub fn evaluate_all(checks: &[Check], result: &InvocationResult) -> Vec<bool> {
    checks.iter().map(|c| c.evaluate(result)).collect()
}

/// A gRPC reply arrived, whatever its code.
pub fn got_reply() -> Check {
    Check::new("got gRPC reply", |r| r.status().is_some())
}

/// The reply status is OK.
pub fn status_ok() -> Check {
    Check::new("status OK", |r| r.status() == Some(Code::Ok))
}

/// First-time success or duplicate-key rejection, both expected when many
/// users submit the same tenant.
pub fn ok_or_already_exists() -> Check {
    Check::new("ok or already exists", |r| {
        matches!(r.status(), Some(Code::Ok) | Some(Code::AlreadyExists))
    })
}

pub fn no_internal_errors() -> Check {
    Check::new("no internal errors", |r| r.status() != Some(Code::Internal))
}

pub fn no_unknown_errors() -> Check {
    Check::new("no unknown errors", |r| r.status() != Some(Code::Unknown))
}
