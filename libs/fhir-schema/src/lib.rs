//! Declarative schema model for FHIR-style resource types
//!
//! Everything the engine knows about a resource comes from data: a
//! `TypeSpec` per type (ordered fields with cardinality, kind and optional
//! terminology binding), collected into a read-only `SchemaRegistry`.
//! Schema packs are produced by an external generator and loaded once at
//! startup; after that the registry is shared freely across threads.

pub mod binding;
pub mod cardinality;
pub mod error;
pub mod field;
pub mod loader;
pub mod registry;
pub mod type_spec;

pub use binding::{Binding, BindingStrength};
pub use cardinality::Cardinality;
pub use error::{Result, SchemaError};
pub use field::{is_primitive_code, variant_key, ChoiceVariant, FieldKind, FieldSpec};
pub use loader::{load_document, load_str};
pub use registry::SchemaRegistry;
pub use type_spec::{ResolvedKey, TypeKind, TypeSpec};
