//! Structural identity
//!
//! `equals` is plain structural `PartialEq` on `Instance`. `fingerprint`
//! digests an instance in schema declaration order, so equal instances
//! produce equal digests regardless of construction order, and an absent
//! field digests differently from a present-but-empty one. Intended for
//! caching keys and idempotence checks in consumers; the engine itself
//! holds no cache.

use sha2::{Digest, Sha256};
use stannum_schema::{FieldKind, SchemaRegistry};

use crate::error::Result;
use crate::instance::{FieldValue, Instance};
use crate::value::Value;

const TAG_ABSENT: u8 = 0;
const TAG_SINGLE: u8 = 1;
const TAG_MANY: u8 = 2;

const TAG_BOOLEAN: u8 = 1;
const TAG_INTEGER: u8 = 2;
const TAG_DECIMAL: u8 = 3;
const TAG_STRING: u8 = 4;
const TAG_INSTANCE: u8 = 5;

/// SHA-256 structural fingerprint of an instance, walked in schema
/// declaration order. Fails only when a type name cannot be resolved
/// against the registry.
pub fn fingerprint(instance: &Instance, registry: &SchemaRegistry) -> Result<[u8; 32]> {
    let mut hasher = Sha256::new();
    digest_instance(&mut hasher, instance, registry)?;
    Ok(hasher.finalize().into())
}

/// Hex form of the fingerprint, convenient for logs and cache keys.
pub fn fingerprint_hex(instance: &Instance, registry: &SchemaRegistry) -> Result<String> {
    Ok(hex::encode(fingerprint(instance, registry)?))
}

fn digest_instance(hasher: &mut Sha256, instance: &Instance, registry: &SchemaRegistry) -> Result<()> {
    let spec = registry.lookup(instance.type_name())?;
    write_str(hasher, instance.type_name());

    for field in &spec.fields {
        match &field.kind {
            FieldKind::Choice(variants) => {
                // Each variant key is its own slot, in declared order.
                for variant in variants {
                    digest_slot(hasher, instance.get(&variant.key), registry)?;
                }
            }
            _ => digest_slot(hasher, instance.get(&field.name), registry)?,
        }
    }

    // Fields the schema does not declare still participate, sorted by name
    // so the digest stays deterministic.
    let mut extras: Vec<&str> = instance
        .field_names()
        .filter(|name| !spec.declares_key(name))
        .collect();
    extras.sort_unstable();
    for name in extras {
        write_str(hasher, name);
        digest_slot(hasher, instance.get(name), registry)?;
    }

    // Preserved unknown wire data, in encounter order.
    for (key, raw) in instance.unknown() {
        write_str(hasher, key);
        let bytes = serde_json::to_vec(raw)?;
        write_bytes(hasher, &bytes);
    }

    Ok(())
}

fn digest_slot(
    hasher: &mut Sha256,
    slot: Option<&FieldValue>,
    registry: &SchemaRegistry,
) -> Result<()> {
    match slot {
        None => hasher.update([TAG_ABSENT]),
        Some(FieldValue::Single(value)) => {
            hasher.update([TAG_SINGLE]);
            digest_value(hasher, value, registry)?;
        }
        Some(FieldValue::Many(values)) => {
            hasher.update([TAG_MANY]);
            hasher.update((values.len() as u64).to_le_bytes());
            for value in values {
                digest_value(hasher, value, registry)?;
            }
        }
    }
    Ok(())
}

fn digest_value(hasher: &mut Sha256, value: &Value, registry: &SchemaRegistry) -> Result<()> {
    match value {
        Value::Boolean(b) => {
            hasher.update([TAG_BOOLEAN, u8::from(*b)]);
        }
        Value::Integer(i) => {
            hasher.update([TAG_INTEGER]);
            hasher.update(i.to_le_bytes());
        }
        Value::Decimal(d) => {
            hasher.update([TAG_DECIMAL]);
            // Normalize so numerically equal decimals (1.10 vs 1.1) digest
            // identically, matching their PartialEq behavior.
            write_str(hasher, &d.normalize().to_string());
        }
        Value::String(s) => {
            hasher.update([TAG_STRING]);
            write_str(hasher, s);
        }
        Value::Instance(nested) => {
            hasher.update([TAG_INSTANCE]);
            digest_instance(hasher, nested, registry)?;
        }
    }
    Ok(())
}

fn write_str(hasher: &mut Sha256, s: &str) {
    write_bytes(hasher, s.as_bytes());
}

fn write_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
