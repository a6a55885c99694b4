//! Terminology-binding enforcement
//!
//! Only `required` bindings with locally enumerated codes are checkable -
//! terminology-server resolution is out of scope. Codes are found in three
//! shapes: a bare primitive code, a Coding-shaped composite
//! (`system` + `code`), or a CodeableConcept-shaped composite (a `coding`
//! list that passes if any entry is permitted).

use stannum_model::{Instance, Value};
use stannum_schema::Binding;

use crate::outcome::{IssueCode, ValidationIssue};

pub(crate) fn check(
    value: &Value,
    binding: &Binding,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if !binding.strength.is_enforced() || !binding.has_codes() {
        return;
    }

    match value {
        Value::String(code) => {
            // A bare code carries no system; any system may supply it.
            if !binding.permits(None, code) {
                issues.push(unbound(binding, path, code));
            }
        }
        Value::Instance(composite) => check_composite(composite, binding, path, issues),
        // Booleans, integers and decimals are never terminology-bound.
        _ => {}
    }
}

fn check_composite(
    composite: &Instance,
    binding: &Binding,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    // Coding shape: system + code on the composite itself.
    if let Some(code) = composite.first("code").and_then(Value::as_str) {
        let system = composite.first("system").and_then(Value::as_str);
        if !binding.permits(system, code) {
            issues.push(unbound(binding, path, code));
        }
        return;
    }

    // CodeableConcept shape: any permitted coding satisfies the binding.
    let codings = composite.values("coding");
    if codings.is_empty() {
        // Nothing coded to check (text-only concepts stay advisory).
        return;
    }

    let mut seen = Vec::new();
    for coding in codings.iter().filter_map(Value::as_instance) {
        if let Some(code) = coding.first("code").and_then(Value::as_str) {
            let system = coding.first("system").and_then(Value::as_str);
            if binding.permits(system, code) {
                return;
            }
            seen.push(code.to_string());
        }
    }

    if !seen.is_empty() {
        issues.push(unbound(binding, path, &seen.join(", ")));
    }
}

fn unbound(binding: &Binding, path: &str, code: &str) -> ValidationIssue {
    let expected = binding
        .value_set
        .clone()
        .unwrap_or_else(|| "enumerated code set".to_string());
    ValidationIssue::error(
        IssueCode::UnboundCode,
        format!("code '{}' is not in the required value set", code),
        path,
    )
    .with_expected(expected)
    .with_actual(code)
}
