//! Payload schema descriptors.

/// Wire kind of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Length-delimited UTF-8 string.
    Str,
    /// Varint-encoded enum value.
    Enum,
}

impl FieldKind {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Str => "string",
            FieldKind::Enum => "enum",
        }
    }
}

/// Descriptor for a single field: name, protobuf tag, kind, requiredness.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub tag: u32,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, tag: u32, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.into(),
            tag,
            kind,
            required,
        }
    }
}

/// The set of fields a request message may carry.
///
/// This is configuration, not generated code; it mirrors whatever proto
/// the target service is versioned against.
#[derive(Debug, Clone)]
pub struct PayloadSchema {
    fields: Vec<FieldSpec>,
}

impl PayloadSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field layout of the tenant registration request
    /// (`kms.api.cmk.registry.tenant.v1.RegisterTenantRequest`).
    pub fn tenant_v1() -> Self {
        Self::new(vec![
            FieldSpec::new("id", 1, FieldKind::Str, true),
            FieldSpec::new("name", 2, FieldKind::Str, true),
            FieldSpec::new("region", 3, FieldKind::Str, true),
            FieldSpec::new("owner_id", 4, FieldKind::Str, false),
            FieldSpec::new("owner_type", 5, FieldKind::Str, false),
            FieldSpec::new("role", 6, FieldKind::Enum, true),
        ])
    }
}
