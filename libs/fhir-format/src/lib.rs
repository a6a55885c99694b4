//! Schema-driven wire formats.
//! Both formats follow the official HL7 mapping rules and take the element
//! order, scalar/array shape and primitive typing from the schema:
//! - Keys/elements appear in declaration order (deterministic output).
//! - Repeating fields are arrays / repeated elements; absent is distinct
//!   from present-but-empty (JSON only - XML cannot spell an empty list).
//! - Choice fields use the type-suffixed key of the populated variant.
//! - Unknown keys on extensible types are preserved losslessly; otherwise
//!   strict mode rejects them and lenient mode drops them.
//!
//! Parsing is total with respect to shape, not validity: cardinality and
//! binding violations deserialize fine and are reported by the validator,
//! never here.

pub mod error;
pub mod json;
pub mod xml;

pub use error::{FormatError, Result};
pub use json::{from_json, from_json_str, to_json, to_json_string};
pub use xml::{from_xml, to_xml};

use stannum_schema::{ChoiceVariant, FieldKind, FieldSpec};

/// How to treat unknown wire keys on non-extensible types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Reject with `FormatError::UnknownField`.
    Strict,
    /// Drop silently.
    #[default]
    Lenient,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub mode: ParseMode,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            mode: ParseMode::Strict,
        }
    }

    pub fn lenient() -> Self {
        Self {
            mode: ParseMode::Lenient,
        }
    }
}

/// What one wire slot parses into.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target<'a> {
    Primitive(&'a str),
    Composite(&'a str),
}

pub(crate) fn field_target(field: &FieldSpec) -> Option<Target<'_>> {
    match &field.kind {
        FieldKind::Primitive(code) => Some(Target::Primitive(code)),
        FieldKind::Composite(type_name) => Some(Target::Composite(type_name)),
        // Choice fields resolve through their variants, never directly.
        FieldKind::Choice(_) => None,
    }
}

pub(crate) fn variant_target(variant: &ChoiceVariant) -> Target<'_> {
    if variant.is_primitive() {
        Target::Primitive(&variant.type_name)
    } else {
        Target::Composite(&variant.type_name)
    }
}
