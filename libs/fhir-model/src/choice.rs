//! Choice-field resolution
//!
//! A choice field (`medication[x]`) is one logical field stored under
//! type-suffixed wire keys (`medicationCodeableConcept` /
//! `medicationReference`). The upstream model library exposed N mutually
//! exclusive accessor attributes per choice and left exclusivity to
//! convention; here the resolver translates between the physical layout and
//! a single tagged value, and `set_choice` clears the other variants so at
//! most one can be populated.

use stannum_schema::{ChoiceVariant, FieldSpec};

use crate::error::{ModelError, Result};
use crate::instance::Instance;
use crate::value::Value;

/// A choice value tagged with the alternative it was stored under.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceValue<'a> {
    pub variant: &'a ChoiceVariant,
    pub value: &'a Value,
}

/// Read the populated alternative of a choice field, scanning variant keys
/// in declaration order. Returns `None` when no variant is set. When a
/// hand-built instance violates exclusivity the first declared variant
/// wins here; the validator reports the conflict.
pub fn get_choice<'a>(instance: &'a Instance, field: &'a FieldSpec) -> Result<Option<ChoiceValue<'a>>> {
    ensure_choice(field)?;
    for variant in field.variants() {
        if let Some(value) = instance.first(&variant.key) {
            return Ok(Some(ChoiceValue { variant, value }));
        }
    }
    Ok(None)
}

/// Store a value under the alternative with concrete type `type_name`,
/// clearing every other variant key first.
pub fn set_choice(
    instance: &mut Instance,
    field: &FieldSpec,
    type_name: &str,
    value: impl Into<Value>,
) -> Result<()> {
    ensure_choice(field)?;
    let selected = field
        .variant_for_type(type_name)
        .ok_or_else(|| ModelError::UnknownVariant {
            path: field.path.clone(),
            variant: type_name.to_string(),
        })?;

    let selected_key = selected.key.clone();
    for variant in field.variants() {
        if variant.key != selected_key {
            instance.remove(&variant.key);
        }
    }
    instance.set(selected_key, value);
    Ok(())
}

/// Remove whichever alternative is populated.
pub fn clear_choice(instance: &mut Instance, field: &FieldSpec) -> Result<()> {
    ensure_choice(field)?;
    for variant in field.variants() {
        instance.remove(&variant.key);
    }
    Ok(())
}

/// Keys of all populated alternatives, in declaration order. More than one
/// entry means the exclusivity invariant is violated.
pub fn populated_variants<'a>(instance: &Instance, field: &'a FieldSpec) -> Vec<&'a ChoiceVariant> {
    field
        .variants()
        .iter()
        .filter(|v| instance.is_present(&v.key))
        .collect()
}

fn ensure_choice(field: &FieldSpec) -> Result<()> {
    if field.is_choice() {
        Ok(())
    } else {
        Err(ModelError::NotAChoice(field.path.clone()))
    }
}
