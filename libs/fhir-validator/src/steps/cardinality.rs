//! Occurrence-count enforcement

use stannum_schema::FieldSpec;

use crate::outcome::{IssueCode, ValidationIssue};

/// Check an observed occurrence count against the declared bounds.
/// Independent of type-correctness: a field can be cardinality-invalid and
/// type-invalid at once, and both get reported.
pub(crate) fn check(
    field: &FieldSpec,
    count: usize,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if field.cardinality.admits(count) {
        return;
    }

    issues.push(
        ValidationIssue::error(
            IssueCode::Cardinality,
            format!(
                "expected {} occurrences of '{}', found {}",
                field.cardinality, field.name, count
            ),
            path,
        )
        .with_expected(field.cardinality.to_string())
        .with_actual(count.to_string()),
    );
}
