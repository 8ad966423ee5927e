//! Request templates: field values, re-evaluated per invocation.

use bytes::{Bytes, BytesMut};
use uuid::Uuid;

use crate::error::EncodeError;

use super::schema::{FieldKind, PayloadSchema};

/// A field value in a request template. Static values encode as-is;
/// generated values are re-evaluated on every build.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Str(String),
    Enum(i32),
    /// A fresh v4 UUID string per build.
    GeneratedUuid,
}

impl FieldValue {
    fn matches(&self, kind: FieldKind) -> bool {
        match self {
            FieldValue::Str(_) | FieldValue::GeneratedUuid => kind == FieldKind::Str,
            FieldValue::Enum(_) => kind == FieldKind::Enum,
        }
    }
}

/// Mapping from field name to value, validated against a [`PayloadSchema`]
/// at build time. Validation failures surface as [`EncodeError`] before
/// any network I/O.
#[derive(Debug, Clone, Default)]
pub struct RequestTemplate {
    fields: Vec<(String, FieldValue)>,
}

impl RequestTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn set(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        let name = name.into();
        self.fields.retain(|(n, _)| *n != name);
        self.fields.push((name, value));
        self
    }

    /// Validate against `schema` and encode to protobuf wire bytes.
    ///
    /// Generated fields are resolved here, so consecutive builds of the
    /// same template can produce distinct payloads.
    pub fn build(&self, schema: &PayloadSchema) -> Result<Bytes, EncodeError> {
        for spec in schema.fields() {
            if spec.required && !self.fields.iter().any(|(n, _)| *n == spec.name) {
                return Err(EncodeError::MissingField(spec.name.clone()));
            }
        }

        let mut buf = BytesMut::new();
        for (name, value) in &self.fields {
            let spec = schema
                .field(name)
                .ok_or_else(|| EncodeError::UnknownField(name.clone()))?;
            if !value.matches(spec.kind) {
                return Err(EncodeError::KindMismatch {
                    field: name.clone(),
                    expected: spec.kind.describe(),
                });
            }
            match value {
                FieldValue::Str(s) => prost::encoding::string::encode(spec.tag, s, &mut buf),
                FieldValue::GeneratedUuid => {
                    let id = Uuid::new_v4().to_string();
                    prost::encoding::string::encode(spec.tag, &id, &mut buf);
                }
                FieldValue::Enum(v) => prost::encoding::int32::encode(spec.tag, v, &mut buf),
            }
        }
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::FieldSpec;

    fn tiny_schema() -> PayloadSchema {
        PayloadSchema::new(vec![
            FieldSpec::new("id", 1, FieldKind::Str, true),
            FieldSpec::new("role", 2, FieldKind::Enum, false),
        ])
    }

    #[test]
    fn encodes_string_and_enum_fields() {
        let template = RequestTemplate::new()
            .set("id", FieldValue::Str("a".into()))
            .set("role", FieldValue::Enum(1));
        let bytes = template.build(&tiny_schema()).unwrap();
        // tag 1 string "a", then tag 2 varint 1
        assert_eq!(&bytes[..], &[0x0a, 0x01, b'a', 0x10, 0x01]);
    }

    #[test]
    fn unknown_field_is_rejected_before_io() {
        let template = RequestTemplate::new()
            .set("id", FieldValue::Str("a".into()))
            .set("bogus", FieldValue::Str("x".into()));
        assert_eq!(
            template.build(&tiny_schema()),
            Err(EncodeError::UnknownField("bogus".into()))
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let template = RequestTemplate::new().set("role", FieldValue::Enum(1));
        assert_eq!(
            template.build(&tiny_schema()),
            Err(EncodeError::MissingField("id".into()))
        );
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let template = RequestTemplate::new().set("id", FieldValue::Enum(7));
        assert_eq!(
            template.build(&tiny_schema()),
            Err(EncodeError::KindMismatch {
                field: "id".into(),
                expected: "string",
            })
        );
    }

    #[test]
    fn generated_uuid_differs_across_builds() {
        let template = RequestTemplate::new().set("id", FieldValue::GeneratedUuid);
        let schema = tiny_schema();
        let first = template.build(&schema).unwrap();
        let second = template.build(&schema).unwrap();
        assert_ne!(first, second);
        // tag byte + length byte + 36-char uuid
        assert_eq!(first.len(), 38);
    }

    #[test]
    fn set_replaces_previous_value() {
        let template = RequestTemplate::new()
            .set("id", FieldValue::Str("old".into()))
            .set("id", FieldValue::Str("new".into()));
        let bytes = template.build(&tiny_schema()).unwrap();
        assert_eq!(&bytes[..], &[0x0a, 0x03, b'n', b'e', b'w']);
    }
}
