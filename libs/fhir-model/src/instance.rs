//! Generic instance container
//!
//! One `Instance` type replaces the per-resource generated classes of the
//! upstream model library: a mapping from field name to value(s), conforming
//! to exactly one `TypeSpec`. Field order on the wire comes from the schema,
//! so the map itself carries no ordering. An absent field is distinct from a
//! present-but-empty repeating field, and that distinction survives
//! equality, hashing and serialization.

use std::collections::HashMap;

use crate::value::Value;

/// Values held under one field name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A scalar field (`max == 1`).
    Single(Value),
    /// A repeating field (`max > 1`). Order is preserved and significant
    /// for round-trip fidelity; it carries no ranking semantics.
    Many(Vec<Value>),
}

impl FieldValue {
    /// Uniform view over the contained values.
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Many(vs) => vs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(vs) => vs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A resource or backbone instance: field name -> value(s), plus unknown
/// wire keys preserved losslessly for extensible types.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instance {
    type_name: String,
    fields: HashMap<String, FieldValue>,
    unknown: Vec<(String, serde_json::Value)>,
}

impl Instance {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: HashMap::new(),
            unknown: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set a scalar field, replacing any previous value(s).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields
            .insert(name.into(), FieldValue::Single(value.into()));
    }

    /// Set a repeating field, replacing any previous value(s). An empty
    /// vector records the field as present-but-empty, which is distinct
    /// from absent.
    pub fn set_many(&mut self, name: impl Into<String>, values: Vec<Value>) {
        self.fields.insert(name.into(), FieldValue::Many(values));
    }

    /// Append to a repeating field, creating it when absent. A scalar value
    /// already stored under the name is promoted to a list.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let entry = self
            .fields
            .entry(name.into())
            .or_insert_with(|| FieldValue::Many(Vec::new()));
        match entry {
            FieldValue::Many(vs) => vs.push(value.into()),
            FieldValue::Single(existing) => {
                let first = existing.clone();
                *entry = FieldValue::Many(vec![first, value.into()]);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// All values under a field name; empty slice when absent.
    pub fn values(&self, name: &str) -> &[Value] {
        self.fields.get(name).map_or(&[], FieldValue::values)
    }

    pub fn first(&self, name: &str) -> Option<&Value> {
        self.values(name).first()
    }

    pub fn count(&self, name: &str) -> usize {
        self.fields.get(name).map_or(0, FieldValue::len)
    }

    /// Whether the field has an entry at all - true for a present-but-empty
    /// repeating field, false for an absent one.
    pub fn is_present(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Unknown wire keys preserved during parsing, in encounter order.
    pub fn unknown(&self) -> &[(String, serde_json::Value)] {
        &self.unknown
    }

    pub fn add_unknown(&mut self, key: impl Into<String>, raw: serde_json::Value) {
        self.unknown.push((key.into(), raw));
    }

    // Chaining forms for building fixtures and literals.

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_many(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.set_many(name, values);
        self
    }
}
