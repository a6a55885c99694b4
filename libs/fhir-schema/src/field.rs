//! Field definitions
//!
//! A `FieldSpec` describes one field of a composite type: its declared
//! path, occurrence bounds, kind (primitive, composite reference or
//! polymorphic choice) and optional terminology binding.

use crate::binding::Binding;
use crate::cardinality::Cardinality;

/// One alternative of a polymorphic choice field.
///
/// `key` is the type-suffixed wire name the variant appears under, e.g.
/// the `Reference` alternative of `medication[x]` is `medicationReference`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceVariant {
    pub type_name: String,
    pub key: String,
}

impl ChoiceVariant {
    pub fn new(base: &str, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let key = variant_key(base, &type_name);
        Self { type_name, key }
    }

    /// Whether this variant refers to a primitive type rather than a
    /// composite defined in the registry.
    pub fn is_primitive(&self) -> bool {
        is_primitive_code(&self.type_name)
    }
}

/// Derive the wire key for a choice alternative: the logical field name
/// followed by the type name with its first character upper-cased
/// (`value` + `dateTime` -> `valueDateTime`).
pub fn variant_key(base: &str, type_name: &str) -> String {
    let mut key = String::with_capacity(base.len() + type_name.len());
    key.push_str(base);
    let mut chars = type_name.chars();
    if let Some(first) = chars.next() {
        key.extend(first.to_uppercase());
        key.push_str(chars.as_str());
    }
    key
}

/// FHIR primitive type codes start with a lowercase letter; composite
/// types are capitalized (`string` vs `CodeableConcept`).
pub fn is_primitive_code(type_name: &str) -> bool {
    type_name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
}

/// What a field may hold.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A primitive value, identified by its FHIR primitive type code.
    Primitive(String),
    /// A nested composite, identified by its registry type name.
    Composite(String),
    /// A polymorphic choice among several concrete types.
    Choice(Vec<ChoiceVariant>),
}

/// Declaration of one field within a `TypeSpec`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Name unique within the owning type. For choice fields this is the
    /// logical name without type suffix (`medication`, not
    /// `medicationReference`).
    pub name: String,
    /// Declared dotted path (`Composition.status`), reproduced verbatim in
    /// validation issue locations.
    pub path: String,
    pub cardinality: Cardinality,
    pub kind: FieldKind,
    pub binding: Option<Binding>,
    /// For reference-typed fields: permissible referenced type identities.
    /// Empty means unconstrained.
    pub target_profiles: Vec<String>,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        kind: FieldKind,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            cardinality,
            kind,
            binding: None,
            target_profiles: Vec::new(),
        }
    }

    /// Shorthand for a primitive field.
    pub fn primitive(
        name: impl Into<String>,
        path: impl Into<String>,
        type_code: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self::new(name, path, FieldKind::Primitive(type_code.into()), cardinality)
    }

    /// Shorthand for a composite field.
    pub fn composite(
        name: impl Into<String>,
        path: impl Into<String>,
        type_name: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self::new(name, path, FieldKind::Composite(type_name.into()), cardinality)
    }

    /// Shorthand for a choice field over the given alternative types.
    pub fn choice<I, S>(
        name: impl Into<String>,
        path: impl Into<String>,
        types: I,
        cardinality: Cardinality,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let variants = types
            .into_iter()
            .map(|t| ChoiceVariant::new(&name, t))
            .collect();
        Self::new(name, path, FieldKind::Choice(variants), cardinality)
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn with_target_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice(_))
    }

    /// The declared alternatives of a choice field, empty otherwise.
    pub fn variants(&self) -> &[ChoiceVariant] {
        match &self.kind {
            FieldKind::Choice(variants) => variants,
            _ => &[],
        }
    }

    /// Find the alternative stored under `key`, if this is a choice field.
    pub fn variant_for_key(&self, key: &str) -> Option<&ChoiceVariant> {
        self.variants().iter().find(|v| v.key == key)
    }

    /// Find the alternative with the given concrete type.
    pub fn variant_for_type(&self, type_name: &str) -> Option<&ChoiceVariant> {
        self.variants().iter().find(|v| v.type_name == type_name)
    }
}
