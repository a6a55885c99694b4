//! Choice-field exclusivity

use stannum_model::{populated_variants, Instance};
use stannum_schema::FieldSpec;

use crate::outcome::{IssueCode, ValidationIssue};

/// A choice field may hold at most one concrete-typed value. Emits exactly
/// one issue per violating field, naming every populated alternative.
pub(crate) fn check_exclusivity(
    instance: &Instance,
    field: &FieldSpec,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let populated = populated_variants(instance, field);
    if populated.len() <= 1 {
        return;
    }

    let keys: Vec<&str> = populated.iter().map(|v| v.key.as_str()).collect();
    issues.push(
        ValidationIssue::error(
            IssueCode::ChoiceConflict,
            format!(
                "choice field '{}' has {} alternatives populated ({}), at most one is allowed",
                field.name,
                keys.len(),
                keys.join(", ")
            ),
            path,
        )
        .with_expected("at most one populated alternative")
        .with_actual(keys.join(", ")),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use stannum_schema::Cardinality;

    #[test]
    fn two_populated_variants_produce_exactly_one_issue() {
        let field = FieldSpec::choice(
            "medication",
            "MedicationRequest.medication[x]",
            ["CodeableConcept", "Reference"],
            Cardinality::required(),
        );

        let mut instance = Instance::new("MedicationRequest");
        instance.set("medicationCodeableConcept", Instance::new("CodeableConcept"));
        instance.set("medicationReference", Instance::new("Reference"));

        let mut issues = Vec::new();
        check_exclusivity(&instance, &field, "MedicationRequest.medication", &mut issues);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::ChoiceConflict);
        assert!(issues[0].diagnostics.contains("medicationCodeableConcept"));
        assert!(issues[0].diagnostics.contains("medicationReference"));
    }

    #[test]
    fn single_variant_is_fine() {
        let field = FieldSpec::choice(
            "medication",
            "MedicationRequest.medication[x]",
            ["CodeableConcept", "Reference"],
            Cardinality::required(),
        );

        let mut instance = Instance::new("MedicationRequest");
        instance.set("medicationReference", Instance::new("Reference"));

        let mut issues = Vec::new();
        check_exclusivity(&instance, &field, "MedicationRequest.medication", &mut issues);
        assert!(issues.is_empty());
    }
}
