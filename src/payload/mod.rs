//! Dynamic request payloads.
//!
//! The request message shape is owned by an externally versioned schema;
//! this module takes a field descriptor set and a value template as
//! configuration and produces protobuf wire bytes, validating the template
//! against the descriptors before any network I/O happens.

mod schema;
mod template;

pub use schema::{FieldKind, FieldSpec, PayloadSchema};
pub use template::{FieldValue, RequestTemplate};
