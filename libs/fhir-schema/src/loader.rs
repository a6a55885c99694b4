//! Schema-pack loader
//!
//! Parses the declarative schema documents produced by the upstream
//! generator (one entry per type, each field carrying `type`/`types`,
//! `path`, `min`, `max` and an optional binding) and converts them into
//! registry entries. The raw document types mirror the generator's JSON
//! shape; the conversion normalizes them into the internal model and
//! reports malformed input with the offending location.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::binding::{Binding, BindingStrength};
use crate::cardinality::Cardinality;
use crate::error::{Result, SchemaError};
use crate::field::{FieldKind, FieldSpec};
use crate::registry::SchemaRegistry;
use crate::type_spec::{TypeKind, TypeSpec};

/// Load a schema pack from its JSON document form and verify that all type
/// references resolve.
pub fn load_document(doc: &Value) -> Result<SchemaRegistry> {
    let document: SchemaDocument = serde_json::from_value(doc.clone())?;

    let mut registry = SchemaRegistry::new();
    for raw in document.types {
        registry.register(convert_type(raw)?);
    }
    registry.verify()?;
    Ok(registry)
}

/// Load a schema pack from JSON text.
pub fn load_str(input: &str) -> Result<SchemaRegistry> {
    let doc: Value = serde_json::from_str(input)?;
    load_document(&doc)
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    types: Vec<RawType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawType {
    name: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    extensible: Option<bool>,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(rename = "type", default)]
    type_: Option<String>,
    #[serde(default)]
    types: Option<Vec<String>>,
    #[serde(default)]
    min: u32,
    #[serde(default)]
    max: Option<String>,
    #[serde(default)]
    binding: Option<RawBinding>,
    #[serde(default)]
    target_profiles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBinding {
    strength: String,
    #[serde(default)]
    value_set: Option<String>,
    #[serde(default)]
    codes: Option<RawCodes>,
}

/// Code sets come either as a flat list or keyed by code-system URI.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCodes {
    Flat(Vec<String>),
    BySystem(HashMap<String, Vec<String>>),
}

fn convert_type(raw: RawType) -> Result<TypeSpec> {
    let kind = match raw.kind.as_deref() {
        None | Some("resource") => TypeKind::Resource,
        Some("complex") | Some("backbone") => TypeKind::Complex,
        Some(other) => {
            return Err(SchemaError::InvalidDocument(format!(
                "type '{}': unknown kind '{}'",
                raw.name, other
            )));
        }
    };

    let mut spec = TypeSpec::new(&raw.name, kind).with_extensible(raw.extensible.unwrap_or(true));
    for field in raw.fields {
        let converted = convert_field(&raw.name, field)?;
        spec = spec.with_field(converted);
    }
    Ok(spec)
}

fn convert_field(type_name: &str, raw: RawField) -> Result<FieldSpec> {
    let path = raw
        .path
        .unwrap_or_else(|| format!("{}.{}", type_name, raw.name));

    let max = raw.max.as_deref().unwrap_or("1");
    let cardinality = Cardinality::parse(&path, raw.min, max)?;

    let kind = match (raw.type_, raw.types) {
        (Some(_), Some(_)) => {
            return Err(SchemaError::InvalidDocument(format!(
                "field {path} declares both 'type' and 'types'"
            )));
        }
        (None, None) => {
            return Err(SchemaError::InvalidDocument(format!(
                "field {path} declares neither 'type' nor 'types'"
            )));
        }
        (Some(single), None) => {
            if crate::field::is_primitive_code(&single) {
                FieldKind::Primitive(single)
            } else {
                FieldKind::Composite(single)
            }
        }
        (None, Some(alternatives)) => {
            if alternatives.is_empty() {
                return Err(SchemaError::InvalidDocument(format!(
                    "field {path} declares an empty 'types' list"
                )));
            }
            return build_choice(raw.name, path, alternatives, cardinality, raw.binding, raw.target_profiles);
        }
    };

    let mut field = FieldSpec::new(raw.name, path, kind, cardinality);
    if let Some(binding) = raw.binding {
        field = field.with_binding(convert_binding(binding)?);
    }
    if let Some(profiles) = raw.target_profiles {
        field = field.with_target_profiles(profiles);
    }
    Ok(field)
}

fn build_choice(
    name: String,
    path: String,
    alternatives: Vec<String>,
    cardinality: Cardinality,
    binding: Option<RawBinding>,
    target_profiles: Option<Vec<String>>,
) -> Result<FieldSpec> {
    let mut field = FieldSpec::choice(name, path, alternatives, cardinality);
    if let Some(raw) = binding {
        field = field.with_binding(convert_binding(raw)?);
    }
    if let Some(profiles) = target_profiles {
        field = field.with_target_profiles(profiles);
    }
    Ok(field)
}

fn convert_binding(raw: RawBinding) -> Result<Binding> {
    let strength: BindingStrength = raw.strength.parse()?;
    let mut binding = Binding::new(strength);
    if let Some(value_set) = raw.value_set {
        binding = binding.with_value_set(value_set);
    }
    match raw.codes {
        Some(RawCodes::Flat(codes)) => {
            binding = binding.with_codes(codes);
        }
        Some(RawCodes::BySystem(by_system)) => {
            for (system, codes) in by_system {
                binding = binding.with_system_codes(system, codes);
            }
        }
        None => {}
    }
    Ok(binding)
}
