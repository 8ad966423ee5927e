//! Invocation engine.
//!
//! Performs a single unary call over a pooled connection and folds the
//! reply status, transport failure, or setup error into an
//! [`InvocationResult`]. The engine never interprets what a status code
//! means; that is left to caller-supplied check predicates.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{Code, Request, Status};

use crate::error::LoadgenError;
use crate::transport::RawCodec;

/// Classified outcome of one attempted invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A gRPC reply was received; carries the status code, OK included.
    Status(Code),
    /// No connection could be established for this iteration.
    ConnectFailed(String),
    /// The payload failed schema validation; nothing was sent.
    EncodeError(String),
    /// The call failed in flight: timeout, reset, deadline exceeded.
    TransportError(String),
    /// Forced down after the graceful-stop window expired.
    Aborted,
}

impl Outcome {
    /// Status code of the reply, if one was received.
    pub fn status(&self) -> Option<Code> {
        match self {
            Outcome::Status(code) => Some(*code),
            _ => None,
        }
    }

    /// Whether the latency of this outcome measures an actual call.
    pub fn has_call_latency(&self) -> bool {
        matches!(self, Outcome::Status(_) | Outcome::TransportError(_))
    }
}

/// One attempted invocation: outcome plus elapsed time. Created once per
/// call, consumed by the metrics aggregator.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub outcome: Outcome,
    pub latency: Duration,
}

impl InvocationResult {
    pub fn new(outcome: Outcome, latency: Duration) -> Self {
        Self { outcome, latency }
    }

    pub fn status(&self) -> Option<Code> {
        self.outcome.status()
    }
}

/// Seam for performing one call. The scheduler drives this; tests swap in
/// scripted implementations.
#[async_trait]
pub trait Invoker: Send + Sync + 'static {
    type Conn: Send + 'static;

    async fn invoke(&self, conn: &mut Self::Conn, payload: Bytes) -> InvocationResult;
}

/// Unary gRPC invoker over a tonic channel, calling a method path taken
/// as opaque configuration.
pub struct GrpcInvoker {
    path: PathAndQuery,
    timeout: Duration,
}

impl GrpcInvoker {
    pub fn new(method: &str, timeout: Duration) -> Result<Self, LoadgenError> {
        let path = format!("/{}", method.trim_start_matches('/'));
        let path = PathAndQuery::try_from(path)
            .map_err(|_| LoadgenError::InvalidMethod(method.to_string()))?;
        Ok(Self { path, timeout })
    }

    fn classify(status: Status) -> Outcome {
        match status.code() {
            // In-flight network failure, not a server verdict.
            Code::Unavailable | Code::DeadlineExceeded => {
                Outcome::TransportError(status.message().to_string())
            }
            code => Outcome::Status(code),
        }
    }
}

#[async_trait]
impl Invoker for GrpcInvoker {
    type Conn = Channel;

    async fn invoke(&self, conn: &mut Channel, payload: Bytes) -> InvocationResult {
        let started = Instant::now();
        let mut grpc = tonic::client::Grpc::new(conn.clone());

        if let Err(e) = grpc.ready().await {
            return InvocationResult::new(
                Outcome::TransportError(e.to_string()),
                started.elapsed(),
            );
        }

        let mut request = Request::new(payload);
        request.set_timeout(self.timeout);

        let outcome = match grpc
            .unary::<Bytes, Bytes, RawCodec>(request, self.path.clone(), RawCodec)
            .await
        {
            Ok(_reply) => Outcome::Status(Code::Ok),
            Err(status) => Self::classify(status),
        };
        InvocationResult::new(outcome, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_path_gets_leading_slash() {
        let invoker = GrpcInvoker::new(
            "kms.api.cmk.registry.tenant.v1.Service/RegisterTenant",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            invoker.path.as_str(),
            "/kms.api.cmk.registry.tenant.v1.Service/RegisterTenant"
        );
    }

    #[test]
    fn whitespace_method_is_rejected() {
        assert!(GrpcInvoker::new("bad method", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn deadline_and_unavailable_classify_as_transport() {
        let transport = GrpcInvoker::classify(Status::deadline_exceeded("too slow"));
        assert!(matches!(transport, Outcome::TransportError(_)));
        let transport = GrpcInvoker::classify(Status::unavailable("reset"));
        assert!(matches!(transport, Outcome::TransportError(_)));
    }

    #[test]
    fn server_statuses_classify_as_replies() {
        let outcome = GrpcInvoker::classify(Status::already_exists("duplicate tenant"));
        assert_eq!(outcome.status(), Some(Code::AlreadyExists));
        let outcome = GrpcInvoker::classify(Status::internal("boom"));
        assert_eq!(outcome.status(), Some(Code::Internal));
    }
}
