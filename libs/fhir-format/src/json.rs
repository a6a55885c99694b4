//! Schema-driven JSON wire format
//!
//! Output follows the schema, not the instance: keys appear in declaration
//! order (`resourceType` first for resources, preserved unknown keys last),
//! repeating fields serialize as arrays even when empty, and choice fields
//! use the type-suffixed key of whichever variant is populated - never two.
//! Parsing is total with respect to shape: cardinality- or binding-invalid
//! documents deserialize fine and are the validator's business.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value as JsonValue};

use stannum_model::{Instance, Value};
use stannum_schema::{FieldKind, ResolvedKey, SchemaRegistry, TypeSpec};

use crate::error::{FormatError, Result};
use crate::{variant_target, ParseMode, ParseOptions, Target};

/// Serialize an instance into its JSON document form.
pub fn to_json(instance: &Instance, registry: &SchemaRegistry) -> Result<JsonValue> {
    let spec = registry.lookup(instance.type_name())?;
    Ok(JsonValue::Object(instance_to_map(instance, spec, registry)?))
}

/// Serialize to pretty-printed JSON text.
pub fn to_json_string(instance: &Instance, registry: &SchemaRegistry) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json(instance, registry)?)?)
}

/// Parse a JSON document into an instance of the named type.
pub fn from_json(
    doc: &JsonValue,
    type_name: &str,
    registry: &SchemaRegistry,
    options: &ParseOptions,
) -> Result<Instance> {
    let spec = registry.lookup(type_name)?;
    let root_path = spec.name.clone();
    parse_object(doc, spec, registry, options, &root_path)
}

/// Parse JSON text into an instance of the named type.
pub fn from_json_str(
    input: &str,
    type_name: &str,
    registry: &SchemaRegistry,
    options: &ParseOptions,
) -> Result<Instance> {
    let doc: JsonValue = serde_json::from_str(input)?;
    from_json(&doc, type_name, registry, options)
}

fn instance_to_map(
    instance: &Instance,
    spec: &TypeSpec,
    registry: &SchemaRegistry,
) -> Result<Map<String, JsonValue>> {
    let mut map = Map::new();
    if spec.is_resource() {
        map.insert(
            "resourceType".to_string(),
            JsonValue::String(spec.name.clone()),
        );
    }

    for field in &spec.fields {
        match &field.kind {
            FieldKind::Choice(variants) => {
                // First populated variant in declaration order; the wire
                // document never carries two alternatives.
                if let Some(variant) = variants.iter().find(|v| instance.is_present(&v.key)) {
                    if let Some(value) = instance.first(&variant.key) {
                        map.insert(
                            variant.key.clone(),
                            value_to_json(value, registry, &field.path)?,
                        );
                    }
                }
            }
            _ => {
                let Some(slot) = instance.get(&field.name) else {
                    continue;
                };
                let values = slot.values();
                let json = if field.cardinality.is_repeating() {
                    JsonValue::Array(
                        values
                            .iter()
                            .map(|v| value_to_json(v, registry, &field.path))
                            .collect::<Result<_>>()?,
                    )
                } else if values.len() == 1 {
                    value_to_json(&values[0], registry, &field.path)?
                } else if values.is_empty() {
                    // A scalar slot holding an empty list has no wire form.
                    continue;
                } else {
                    // Over-filled scalar: keep the shape so the validator's
                    // cardinality finding survives a round trip.
                    JsonValue::Array(
                        values
                            .iter()
                            .map(|v| value_to_json(v, registry, &field.path))
                            .collect::<Result<_>>()?,
                    )
                };
                map.insert(field.name.clone(), json);
            }
        }
    }

    for (key, raw) in instance.unknown() {
        map.insert(key.clone(), raw.clone());
    }

    Ok(map)
}

fn value_to_json(value: &Value, registry: &SchemaRegistry, path: &str) -> Result<JsonValue> {
    Ok(match value {
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        Value::Decimal(d) => {
            let float = d
                .to_f64()
                .ok_or_else(|| FormatError::invalid(path, "decimal out of range"))?;
            let number = Number::from_f64(float)
                .ok_or_else(|| FormatError::invalid(path, "decimal is not a finite number"))?;
            JsonValue::Number(number)
        }
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Instance(nested) => {
            let spec = registry.lookup(nested.type_name())?;
            JsonValue::Object(instance_to_map(nested, spec, registry)?)
        }
    })
}

fn parse_object(
    doc: &JsonValue,
    spec: &TypeSpec,
    registry: &SchemaRegistry,
    options: &ParseOptions,
    path: &str,
) -> Result<Instance> {
    let Some(obj) = doc.as_object() else {
        return Err(FormatError::ExpectedObject(path.to_string()));
    };

    if spec.is_resource() {
        if let Some(declared) = obj.get("resourceType").and_then(JsonValue::as_str) {
            if declared != spec.name {
                return Err(FormatError::TypeMismatch {
                    expected: spec.name.clone(),
                    declared: declared.to_string(),
                });
            }
        }
    }

    let mut instance = Instance::new(&spec.name);
    for (key, raw) in obj {
        if key == "resourceType" && spec.is_resource() {
            continue;
        }
        let key_path = format!("{}.{}", path, key);
        match spec.resolve_key(key) {
            Some(ResolvedKey::Field(field)) => {
                let Some(target) = crate::field_target(field) else {
                    continue;
                };
                if field.cardinality.is_repeating() {
                    let Some(items) = raw.as_array() else {
                        return Err(FormatError::invalid(
                            key_path,
                            "expected an array for a repeating field",
                        ));
                    };
                    let values = items
                        .iter()
                        .map(|item| parse_single(item, target, registry, options, &key_path))
                        .collect::<Result<Vec<_>>>()?;
                    instance.set_many(field.name.clone(), values);
                } else {
                    if raw.is_array() {
                        return Err(FormatError::invalid(
                            key_path,
                            "expected a single value, found an array",
                        ));
                    }
                    let value = parse_single(raw, target, registry, options, &key_path)?;
                    instance.set(field.name.clone(), value);
                }
            }
            Some(ResolvedKey::ChoiceVariant { variant, .. }) => {
                // Choice fields are always scalar on the wire. A document
                // carrying several variants parses; the validator reports
                // the conflict.
                let value = parse_single(raw, variant_target(variant), registry, options, &key_path)?;
                instance.set(variant.key.clone(), value);
            }
            None => match (spec.extensible, options.mode) {
                (true, _) => instance.add_unknown(key.clone(), raw.clone()),
                (false, ParseMode::Strict) => {
                    return Err(FormatError::UnknownField {
                        path: path.to_string(),
                        field: key.clone(),
                    });
                }
                (false, ParseMode::Lenient) => {}
            },
        }
    }

    Ok(instance)
}

fn parse_single(
    raw: &JsonValue,
    target: Target<'_>,
    registry: &SchemaRegistry,
    options: &ParseOptions,
    path: &str,
) -> Result<Value> {
    match target {
        Target::Primitive(code) => parse_primitive(raw, code, path),
        Target::Composite(type_name) => {
            let spec = registry.lookup(type_name)?;
            Ok(Value::Instance(parse_object(raw, spec, registry, options, path)?))
        }
    }
}

fn parse_primitive(raw: &JsonValue, code: &str, path: &str) -> Result<Value> {
    match code {
        "boolean" => raw
            .as_bool()
            .map(Value::Boolean)
            .ok_or_else(|| FormatError::invalid(path, "expected a boolean")),
        "integer" | "positiveInt" | "unsignedInt" => raw
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| FormatError::invalid(path, "expected an integer")),
        "decimal" => match raw {
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else {
                    Decimal::from_str(&n.to_string())
                        .map(Value::Decimal)
                        .map_err(|_| FormatError::invalid(path, "decimal out of range"))
                }
            }
            _ => Err(FormatError::invalid(path, "expected a number")),
        },
        _ => raw
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| FormatError::invalid(path, "expected a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stannum_schema::load_document;

    fn registry() -> SchemaRegistry {
        load_document(&json!({
            "types": [
                {
                    "name": "MedicationRequest",
                    "fields": [
                        { "name": "status", "type": "code", "min": 1, "max": "1" },
                        { "name": "priority", "type": "code", "min": 0, "max": "1" },
                        { "name": "medication", "types": ["CodeableConcept", "Reference"],
                          "min": 1, "max": "1" },
                        { "name": "note", "type": "string", "min": 0, "max": "*" }
                    ]
                },
                {
                    "name": "CodeableConcept", "kind": "complex", "extensible": false,
                    "fields": [
                        { "name": "text", "type": "string", "min": 0, "max": "1" }
                    ]
                },
                {
                    "name": "Reference", "kind": "complex",
                    "fields": [
                        { "name": "reference", "type": "string", "min": 0, "max": "1" }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn output_keys_follow_declaration_order() {
        let registry = registry();
        // Built in reverse order on purpose.
        let mut instance = Instance::new("MedicationRequest");
        instance.set_many("note", vec!["take with food".into()]);
        instance.set(
            "medicationReference",
            Instance::new("Reference").with("reference", "Medication/1"),
        );
        instance.set("status", "active");

        let doc = to_json(&instance, &registry).unwrap();
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            ["resourceType", "status", "medicationReference", "note"]
        );
    }

    #[test]
    fn absent_key_versus_empty_array() {
        let registry = registry();
        let base = Instance::new("MedicationRequest").with("status", "active");

        let doc = to_json(&base, &registry).unwrap();
        assert!(doc.get("note").is_none());

        let doc = to_json(&base.clone().with_many("note", vec![]), &registry).unwrap();
        assert_eq!(doc["note"], json!([]));
    }

    #[test]
    fn choice_serializes_one_suffixed_key() {
        let registry = registry();
        let mut instance = Instance::new("MedicationRequest");
        instance.set("status", "active");
        instance.set(
            "medicationCodeableConcept",
            Instance::new("CodeableConcept").with("text", "aspirin"),
        );

        let doc = to_json(&instance, &registry).unwrap();
        assert_eq!(doc["medicationCodeableConcept"]["text"], "aspirin");
        assert!(doc.get("medicationReference").is_none());
        assert!(doc.get("medication").is_none());
    }

    #[test]
    fn scalar_field_rejects_array_shape() {
        let registry = registry();
        let err = from_json(
            &json!({ "status": ["active", "on-hold"] }),
            "MedicationRequest",
            &registry,
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::InvalidValue { path, .. }
            if path == "MedicationRequest.status"));
    }

    #[test]
    fn cardinality_violations_still_parse() {
        let registry = registry();
        // status missing: shape-valid, semantically invalid - parses fine.
        let instance = from_json(
            &json!({ "note": ["a", "b"] }),
            "MedicationRequest",
            &registry,
            &ParseOptions::default(),
        )
        .unwrap();
        assert!(!instance.is_present("status"));
        assert_eq!(instance.count("note"), 2);
    }

    #[test]
    fn unknown_keys_follow_mode_and_extensibility() {
        let registry = registry();

        // Extensible resource: preserved in both modes.
        let instance = from_json(
            &json!({ "status": "active", "extension": [{ "url": "u" }] }),
            "MedicationRequest",
            &registry,
            &ParseOptions::strict(),
        )
        .unwrap();
        assert_eq!(instance.unknown().len(), 1);

        // Non-extensible composite, strict: rejected.
        let err = from_json(
            &json!({ "text": "aspirin", "custom": 1 }),
            "CodeableConcept",
            &registry,
            &ParseOptions::strict(),
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::UnknownField { field, .. } if field == "custom"));

        // Non-extensible composite, lenient: dropped.
        let instance = from_json(
            &json!({ "text": "aspirin", "custom": 1 }),
            "CodeableConcept",
            &registry,
            &ParseOptions::default(),
        )
        .unwrap();
        assert!(instance.unknown().is_empty());
        assert!(!instance.is_present("custom"));
    }

    #[test]
    fn mismatched_resource_type_is_rejected() {
        let registry = registry();
        let err = from_json(
            &json!({ "resourceType": "Observation" }),
            "MedicationRequest",
            &registry,
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::TypeMismatch { declared, .. }
            if declared == "Observation"));
    }
}
