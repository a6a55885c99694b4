//! Schema-driven XML wire format
//!
//! Follows the HL7 element conventions: the root element is named by the
//! resource type in the FHIR namespace, one element per field in
//! declaration order, primitives encoded with the `value` attribute,
//! repeating fields as repeated elements, choice fields under their
//! type-suffixed element name. One caveat the schema cannot paper over:
//! XML has no way to spell a present-but-empty list, so that distinction
//! only survives JSON round trips.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use roxmltree::Document;
use rust_decimal::Decimal;
use serde_json::{Map, Value as JsonValue};

use stannum_model::{Instance, Value};
use stannum_schema::{FieldKind, ResolvedKey, SchemaRegistry, TypeSpec};

use crate::error::{FormatError, Result};
use crate::{variant_target, ParseMode, ParseOptions, Target};

const FHIR_NS: &str = "http://hl7.org/fhir";

/// Serialize an instance into its XML document form.
pub fn to_xml(instance: &Instance, registry: &SchemaRegistry) -> Result<String> {
    let spec = registry.lookup(instance.type_name())?;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    let mut root = BytesStart::new(spec.name.as_str());
    root.push_attribute(("xmlns", FHIR_NS));
    writer.write_event(Event::Start(root))?;
    write_fields(&mut writer, instance, spec, registry)?;
    writer.write_event(Event::End(BytesEnd::new(spec.name.as_str())))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

/// Parse an XML document into an instance of the named type.
pub fn from_xml(
    input: &str,
    type_name: &str,
    registry: &SchemaRegistry,
    options: &ParseOptions,
) -> Result<Instance> {
    let doc = Document::parse(input)?;
    let root = doc.root_element();
    let spec = registry.lookup(type_name)?;

    if root.tag_name().name() != spec.name {
        return Err(FormatError::TypeMismatch {
            expected: spec.name.clone(),
            declared: root.tag_name().name().to_string(),
        });
    }

    let root_path = spec.name.clone();
    parse_element(&root, spec, registry, options, &root_path)
}

fn write_fields(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    instance: &Instance,
    spec: &TypeSpec,
    registry: &SchemaRegistry,
) -> Result<()> {
    for field in &spec.fields {
        match &field.kind {
            FieldKind::Choice(variants) => {
                if let Some(variant) = variants.iter().find(|v| instance.is_present(&v.key)) {
                    if let Some(value) = instance.first(&variant.key) {
                        write_value(writer, &variant.key, value, registry)?;
                    }
                }
            }
            _ => {
                for value in instance.values(&field.name) {
                    write_value(writer, &field.name, value, registry)?;
                }
            }
        }
    }

    for (key, raw) in instance.unknown() {
        write_raw(writer, key, raw)?;
    }

    Ok(())
}

fn write_value(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    value: &Value,
    registry: &SchemaRegistry,
) -> Result<()> {
    if let Value::Instance(nested) = value {
        let spec = registry.lookup(nested.type_name())?;
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        write_fields(writer, nested, spec, registry)?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        return Ok(());
    }

    let text = match value {
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::String(s) => s.clone(),
        Value::Instance(_) => String::new(), // handled above
    };
    let mut elem = BytesStart::new(name);
    elem.push_attribute(("value", text.as_str()));
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

/// Re-expand preserved unknown JSON data into elements, mirroring how it
/// was collapsed on the way in.
fn write_raw(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    value: &JsonValue,
) -> Result<()> {
    match value {
        JsonValue::Array(items) => {
            for item in items {
                write_raw(writer, name, item)?;
            }
        }
        JsonValue::Object(obj) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            for (key, child) in obj {
                // `_field` primitive-metadata keys have no element form.
                if !key.starts_with('_') {
                    write_raw(writer, key, child)?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        JsonValue::Null => {}
        primitive => {
            let text = match primitive {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            let mut elem = BytesStart::new(name);
            elem.push_attribute(("value", text.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }
    }
    Ok(())
}

fn parse_element(
    node: &roxmltree::Node,
    spec: &TypeSpec,
    registry: &SchemaRegistry,
    options: &ParseOptions,
    path: &str,
) -> Result<Instance> {
    let mut instance = Instance::new(&spec.name);

    // Collect values per wire key first: repeated elements arrive one at a
    // time and XML offers no scalar/array distinction, so the declared
    // cardinality decides the stored shape afterwards.
    let mut collected: Vec<(String, Vec<Value>)> = Vec::new();
    let mut unknown: Vec<(String, Vec<JsonValue>)> = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        let name = child.tag_name().name();
        let child_path = format!("{}.{}", path, name);

        let (key, target) = match spec.resolve_key(name) {
            Some(ResolvedKey::Field(field)) => {
                let Some(target) = crate::field_target(field) else {
                    continue;
                };
                (field.name.as_str(), target)
            }
            Some(ResolvedKey::ChoiceVariant { variant, .. }) => {
                (variant.key.as_str(), variant_target(variant))
            }
            None => {
                match (spec.extensible, options.mode) {
                    (true, _) => match unknown.iter_mut().find(|(k, _)| k == name) {
                        Some((_, items)) => items.push(element_to_raw(&child)),
                        None => unknown.push((name.to_string(), vec![element_to_raw(&child)])),
                    },
                    (false, ParseMode::Strict) => {
                        return Err(FormatError::UnknownField {
                            path: path.to_string(),
                            field: name.to_string(),
                        });
                    }
                    (false, ParseMode::Lenient) => {}
                }
                continue;
            }
        };

        let value = parse_node_value(&child, target, registry, options, &child_path)?;
        match collected.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => collected.push((key.to_string(), vec![value])),
        }
    }

    for (key, mut values) in collected {
        let repeating = matches!(
            spec.resolve_key(&key),
            Some(ResolvedKey::Field(field)) if field.cardinality.is_repeating()
        );
        if repeating || values.len() > 1 {
            // A scalar element appearing twice is a cardinality violation,
            // not a parse error - keep all occurrences for the validator.
            instance.set_many(key, values);
        } else if let Some(value) = values.pop() {
            instance.set(key, value);
        }
    }

    for (key, mut items) in unknown {
        if items.len() > 1 {
            instance.add_unknown(key, JsonValue::Array(items));
        } else if let Some(item) = items.pop() {
            instance.add_unknown(key, item);
        }
    }

    Ok(instance)
}

fn parse_node_value(
    node: &roxmltree::Node,
    target: Target<'_>,
    registry: &SchemaRegistry,
    options: &ParseOptions,
    path: &str,
) -> Result<Value> {
    match target {
        Target::Primitive(code) => {
            let text = node
                .attribute("value")
                .ok_or_else(|| FormatError::invalid(path, "missing value attribute"))?;
            parse_primitive_text(text, code, path)
        }
        Target::Composite(type_name) => {
            let spec = registry.lookup(type_name)?;
            Ok(Value::Instance(parse_element(node, spec, registry, options, path)?))
        }
    }
}

fn parse_primitive_text(text: &str, code: &str, path: &str) -> Result<Value> {
    match code {
        "boolean" => match text {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(FormatError::invalid(path, "expected 'true' or 'false'")),
        },
        "integer" | "positiveInt" | "unsignedInt" => text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| FormatError::invalid(path, "expected an integer")),
        "decimal" => {
            if let Ok(i) = text.parse::<i64>() {
                Ok(Value::Integer(i))
            } else {
                text.parse::<Decimal>()
                    .map(Value::Decimal)
                    .map_err(|_| FormatError::invalid(path, "expected a decimal"))
            }
        }
        _ => Ok(Value::String(text.to_string())),
    }
}

/// Collapse an unknown element into opaque JSON: the `value` attribute for
/// primitive-shaped elements, an object of children otherwise, repeated
/// names merged into arrays.
fn element_to_raw(node: &roxmltree::Node) -> JsonValue {
    if let Some(text) = node.attribute("value") {
        return raw_primitive(text);
    }

    let mut obj = Map::new();
    for child in node.children().filter(|n| n.is_element()) {
        let value = element_to_raw(&child);
        insert_raw_property(&mut obj, child.tag_name().name(), value);
    }
    JsonValue::Object(obj)
}

fn insert_raw_property(map: &mut Map<String, JsonValue>, name: &str, value: JsonValue) {
    match map.entry(name.to_string()) {
        serde_json::map::Entry::Vacant(slot) => {
            slot.insert(value);
        }
        serde_json::map::Entry::Occupied(mut slot) => match slot.get_mut() {
            JsonValue::Array(arr) => arr.push(value),
            existing => {
                let first = existing.take();
                *existing = JsonValue::Array(vec![first, value]);
            }
        },
    }
}

fn raw_primitive(text: &str) -> JsonValue {
    match text {
        "true" => JsonValue::Bool(true),
        "false" => JsonValue::Bool(false),
        _ => {
            if let Ok(int) = text.parse::<i64>() {
                JsonValue::Number(int.into())
            } else {
                JsonValue::String(text.to_string())
            }
        }
    }
}
