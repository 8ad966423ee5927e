//! Error types for the load-generation core.
//!
//! The per-invocation taxonomy (connect, encode, transport, aborted) is
//! deliberately small: every failure a virtual user can hit is captured
//! into an invocation result and aggregated, never propagated out of the
//! iteration loop.

use thiserror::Error;

/// Connection-establishment failures: transport refusal or TLS setup.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Failed to establish a transport connection to the target.
    #[error("connection to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    /// Connection refused for a non-transport reason (pool shutdown, test doubles).
    #[error("connection to {endpoint} refused: {reason}")]
    Refused { endpoint: String, reason: String },

    /// The configured target does not form a valid URI.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// TLS certificate or key material could not be read.
    #[error("failed to read TLS material {path}: {source}")]
    TlsMaterial {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The transport rejected the assembled TLS configuration.
    #[error("TLS configuration rejected: {source}")]
    TlsConfig {
        #[source]
        source: tonic::transport::Error,
    },
}

/// Payload build failures, surfaced before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("field {0:?} is not part of the payload schema")]
    UnknownField(String),

    #[error("required field {0:?} missing from request template")]
    MissingField(String),

    #[error("field {field:?} expects a {expected} value")]
    KindMismatch {
        field: String,
        expected: &'static str,
    },
}

/// Run-level errors: setup problems that prevent a run from starting.
///
/// Per-call failures never take this shape; they become invocation
/// results instead.
#[derive(Debug, Error)]
pub enum LoadgenError {
    #[error("invalid method path {0:?}")]
    InvalidMethod(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

pub type LoadgenResult<T> = Result<T, LoadgenError>;
