//! Schema registry
//!
//! Process-wide lookup from type name to `TypeSpec`. Populated once during
//! startup and read-only afterwards: consumers share the registry behind an
//! `Arc` and validation/serialization calls read it concurrently without
//! locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, SchemaError};
use crate::field::{is_primitive_code, FieldKind};
use crate::type_spec::TypeSpec;

#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    types: HashMap<String, Arc<TypeSpec>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type definition. Last registration wins; the registry is
    /// only mutated during the construction phase.
    pub fn register(&mut self, spec: TypeSpec) {
        self.types.insert(spec.name.clone(), Arc::new(spec));
    }

    /// Look up a type. A miss is a programmer error on the caller's side
    /// and fatal to the calling operation.
    pub fn lookup(&self, name: &str) -> Result<&Arc<TypeSpec>> {
        self.types
            .get(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeSpec>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeSpec>> {
        self.types.values()
    }

    /// Check that every composite and choice type reference resolves to a
    /// registered type, so dangling references surface at load time instead
    /// of mid-validation.
    pub fn verify(&self) -> Result<()> {
        for spec in self.types.values() {
            for field in &spec.fields {
                match &field.kind {
                    FieldKind::Primitive(_) => {}
                    FieldKind::Composite(target) => {
                        self.check_reference(&field.path, target)?;
                    }
                    FieldKind::Choice(variants) => {
                        for variant in variants {
                            if !variant.is_primitive() {
                                self.check_reference(&field.path, &variant.type_name)?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_reference(&self, path: &str, target: &str) -> Result<()> {
        if is_primitive_code(target) || self.types.contains_key(target) {
            Ok(())
        } else {
            Err(SchemaError::UnresolvedReference {
                path: path.to_string(),
                target: target.to_string(),
            })
        }
    }
}
