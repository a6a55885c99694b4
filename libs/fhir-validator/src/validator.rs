//! Schema-driven instance validation
//!
//! One reusable `Validator` owns the registry and compiled primitive
//! patterns; each `validate` call is a pure, synchronous walk over
//! (instance, schema) that accumulates every issue before returning.
//! Nothing short-circuits: a caller fixing a payload sees all problems in
//! one pass. The only fatal error is a type name the registry cannot
//! resolve.

use std::sync::Arc;

use stannum_model::{Instance, Value};
use stannum_schema::{FieldKind, FieldSpec, SchemaError, SchemaRegistry, TypeSpec};

use crate::outcome::{IssueCode, IssueSeverity, ValidationIssue, ValidationOutcome};
use crate::steps;
use crate::steps::primitive::PrimitiveChecks;

#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    /// Check primitive lexical forms (dates, ids, uris, ...) in addition to
    /// the structural checks. On by default.
    pub check_primitive_formats: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            check_primitive_formats: true,
        }
    }
}

/// Reusable validator - owns the registry handle and compiled patterns.
pub struct Validator {
    registry: Arc<SchemaRegistry>,
    options: ValidatorOptions,
    primitives: PrimitiveChecks,
}

impl Validator {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_options(registry, ValidatorOptions::default())
    }

    pub fn with_options(registry: Arc<SchemaRegistry>, options: ValidatorOptions) -> Self {
        Self {
            registry,
            options,
            primitives: PrimitiveChecks::new(),
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Validate against the type named by the instance itself.
    pub fn validate(&self, instance: &Instance) -> Result<ValidationOutcome, SchemaError> {
        self.validate_as(instance, instance.type_name())
    }

    /// Validate against an explicitly named type.
    pub fn validate_as(
        &self,
        instance: &Instance,
        type_name: &str,
    ) -> Result<ValidationOutcome, SchemaError> {
        let spec = Arc::clone(self.registry.lookup(type_name)?);

        let mut issues = Vec::new();
        self.check_instance(instance, &spec, &spec.name, &mut issues);

        let valid = !issues.iter().any(|i| i.severity == IssueSeverity::Error);
        Ok(ValidationOutcome {
            type_name: spec.name.clone(),
            valid,
            issues,
        })
    }

    fn check_instance(
        &self,
        instance: &Instance,
        spec: &TypeSpec,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for field in &spec.fields {
            let field_path = format!("{}.{}", path, field.name);
            match &field.kind {
                FieldKind::Primitive(code) => {
                    steps::cardinality::check(field, instance.count(&field.name), &field_path, issues);
                    for value in instance.values(&field.name) {
                        self.check_primitive_value(value, code, field, &field_path, issues);
                    }
                }
                FieldKind::Composite(target) => {
                    steps::cardinality::check(field, instance.count(&field.name), &field_path, issues);
                    for value in instance.values(&field.name) {
                        self.check_composite_value(value, target, field, &field_path, issues);
                    }
                }
                FieldKind::Choice(variants) => {
                    let total: usize = variants.iter().map(|v| instance.count(&v.key)).sum();
                    steps::cardinality::check(field, total, &field_path, issues);
                    steps::choice::check_exclusivity(instance, field, &field_path, issues);

                    for variant in variants {
                        let variant_path = format!("{}.{}", path, variant.key);
                        for value in instance.values(&variant.key) {
                            if variant.is_primitive() {
                                self.check_primitive_value(
                                    value,
                                    &variant.type_name,
                                    field,
                                    &variant_path,
                                    issues,
                                );
                            } else {
                                self.check_composite_value(
                                    value,
                                    &variant.type_name,
                                    field,
                                    &variant_path,
                                    issues,
                                );
                            }
                        }
                    }
                }
            }
        }

        self.check_undeclared(instance, spec, path, issues);
    }

    fn check_primitive_value(
        &self,
        value: &Value,
        type_code: &str,
        field: &FieldSpec,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let kind_ok = match type_code {
            "boolean" => matches!(value, Value::Boolean(_)),
            "integer" | "positiveInt" | "unsignedInt" => matches!(value, Value::Integer(_)),
            "decimal" => matches!(value, Value::Integer(_) | Value::Decimal(_)),
            _ => matches!(value, Value::String(_)),
        };
        if !kind_ok {
            issues.push(
                ValidationIssue::error(
                    IssueCode::TypeMismatch,
                    format!(
                        "expected a {} value, found {}",
                        type_code,
                        value.type_label()
                    ),
                    path,
                )
                .with_expected(type_code)
                .with_actual(value.type_label()),
            );
            return;
        }

        if let Some(binding) = &field.binding {
            steps::binding::check(value, binding, path, issues);
        }
        if self.options.check_primitive_formats {
            self.primitives.check(value, type_code, path, issues);
        }
    }

    fn check_composite_value(
        &self,
        value: &Value,
        target: &str,
        field: &FieldSpec,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let Some(nested) = value.as_instance() else {
            issues.push(
                ValidationIssue::error(
                    IssueCode::TypeMismatch,
                    format!("expected a {} value, found {}", target, value.type_label()),
                    path,
                )
                .with_expected(target)
                .with_actual(value.type_label()),
            );
            return;
        };

        if nested.type_name() != target {
            issues.push(
                ValidationIssue::error(
                    IssueCode::TypeMismatch,
                    format!(
                        "expected an instance of '{}', found '{}'",
                        target,
                        nested.type_name()
                    ),
                    path,
                )
                .with_expected(target)
                .with_actual(nested.type_name()),
            );
        }

        if let Some(binding) = &field.binding {
            steps::binding::check(value, binding, path, issues);
        }

        // Validate against the declared type; the registry is verified at
        // load time, so a miss here means the schema changed underneath us.
        match self.registry.get(target) {
            Some(spec) => self.check_instance(nested, spec, path, issues),
            None => issues.push(
                ValidationIssue::error(
                    IssueCode::TypeMismatch,
                    format!("type '{}' is not defined in the schema", target),
                    path,
                )
                .with_expected(target),
            ),
        }
    }

    fn check_undeclared(
        &self,
        instance: &Instance,
        spec: &TypeSpec,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let mut undeclared: Vec<&str> = instance
            .field_names()
            .filter(|name| !spec.declares_key(name))
            .collect();
        undeclared.sort_unstable();

        for name in undeclared {
            let issue_path = format!("{}.{}", path, name);
            let diagnostics = format!("field '{}' is not declared by type '{}'", name, spec.name);
            let issue = if spec.extensible {
                ValidationIssue::warning(IssueCode::UnknownElement, diagnostics, issue_path)
            } else {
                ValidationIssue::error(IssueCode::UnknownElement, diagnostics, issue_path)
            };
            issues.push(issue);
        }
    }
}
