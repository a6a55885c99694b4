//! Type definitions
//!
//! A `TypeSpec` is a named, ordered sequence of field declarations. It
//! represents either a top-level resource or a nested backbone type scoped
//! to its parent (`Composition.Section`, `DocumentReference.Content`, ...).
//! Type definitions may reference themselves recursively; that recursion is
//! in the definition graph, instances remain trees.

use crate::field::{ChoiceVariant, FieldSpec};

/// Whether a type is a wire-level document root or a nested structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Top-level resource: carries `resourceType` in JSON, forms the XML
    /// document root.
    Resource,
    /// Backbone/complex type nested inside a resource.
    Complex,
}

/// A named composite type: ordered fields plus extensibility.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub kind: TypeKind,
    /// Extensible types preserve unknown wire keys losslessly as opaque
    /// extension data; non-extensible types reject them in strict parsing.
    pub extensible: bool,
    pub fields: Vec<FieldSpec>,
}

impl TypeSpec {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            extensible: true,
            fields: Vec::new(),
        }
    }

    pub fn resource(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Resource)
    }

    pub fn complex(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Complex)
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_extensible(mut self, extensible: bool) -> Self {
        self.extensible = extensible;
        self
    }

    pub fn is_resource(&self) -> bool {
        self.kind == TypeKind::Resource
    }

    /// Look up a field by its declared (logical) name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolve a wire key against this type: either a declared field name,
    /// or a variant key of one of its choice fields.
    pub fn resolve_key(&self, key: &str) -> Option<ResolvedKey<'_>> {
        for field in &self.fields {
            if field.is_choice() {
                if let Some(variant) = field.variant_for_key(key) {
                    return Some(ResolvedKey::ChoiceVariant { field, variant });
                }
            } else if field.name == key {
                return Some(ResolvedKey::Field(field));
            }
        }
        None
    }

    /// Whether `key` is meaningful on this type at all.
    pub fn declares_key(&self, key: &str) -> bool {
        self.resolve_key(key).is_some()
    }
}

/// Result of resolving a wire key against a `TypeSpec`.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedKey<'a> {
    /// A plain declared field.
    Field(&'a FieldSpec),
    /// A type-suffixed alternative of a choice field.
    ChoiceVariant {
        field: &'a FieldSpec,
        variant: &'a ChoiceVariant,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cardinality::Cardinality;

    fn medication_request() -> TypeSpec {
        TypeSpec::resource("MedicationRequest")
            .with_field(FieldSpec::primitive(
                "status",
                "MedicationRequest.status",
                "code",
                Cardinality::required(),
            ))
            .with_field(FieldSpec::choice(
                "medication",
                "MedicationRequest.medication[x]",
                ["CodeableConcept", "Reference"],
                Cardinality::required(),
            ))
    }

    #[test]
    fn resolves_plain_and_variant_keys() {
        let spec = medication_request();

        assert!(matches!(spec.resolve_key("status"), Some(ResolvedKey::Field(_))));

        match spec.resolve_key("medicationReference") {
            Some(ResolvedKey::ChoiceVariant { field, variant }) => {
                assert_eq!(field.name, "medication");
                assert_eq!(variant.type_name, "Reference");
            }
            other => panic!("unexpected resolution: {other:?}"),
        }

        // The logical name of a choice field is not itself a wire key.
        assert!(spec.resolve_key("medication").is_none());
        assert!(spec.resolve_key("medicationQuantity").is_none());
    }
}
