//! Generic instance model
//!
//! A single `Instance` container plus schema-driven accessors replaces the
//! per-resource class explosion of generated model libraries. The crate
//! covers:
//! - typed field values (`Value`, `FieldValue`) with absent distinct from
//!   present-but-empty
//! - choice-field resolution between logical names and type-suffixed wire
//!   keys, with structural mutual exclusion
//! - structural equality and schema-ordered SHA-256 fingerprints

pub mod choice;
pub mod error;
pub mod identity;
pub mod instance;
pub mod value;

pub use choice::{clear_choice, get_choice, populated_variants, set_choice, ChoiceValue};
pub use error::{ModelError, Result};
pub use identity::{fingerprint, fingerprint_hex};
pub use instance::{FieldValue, Instance};
pub use value::Value;
