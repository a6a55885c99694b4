//! End-to-end validation scenarios over a realistic schema pack

use std::sync::Arc;

use serde_json::json;
use stannum_model::{Instance, Value};
use stannum_schema::{load_document, SchemaError, SchemaRegistry};
use stannum_validator::{IssueCode, Validator, ValidatorOptions};

/// A pack resembling the generator's output for a handful of resources,
/// including a required-strength status binding, a recursive section
/// backbone and a medication[x] choice.
fn pack() -> Arc<SchemaRegistry> {
    let doc = json!({
        "types": [
            {
                "name": "Composition",
                "kind": "resource",
                "fields": [
                    { "name": "status", "path": "Composition.status", "type": "code",
                      "min": 1, "max": "1",
                      "binding": { "strength": "required",
                                   "valueSet": "http://hl7.org/fhir/ValueSet/composition-status",
                                   "codes": ["preliminary", "final", "amended", "entered-in-error"] } },
                    { "name": "language", "path": "Composition.language", "type": "code",
                      "min": 0, "max": "1",
                      "binding": { "strength": "preferred",
                                   "codes": ["en", "de", "fr"] } },
                    { "name": "type", "path": "Composition.type", "type": "CodeableConcept",
                      "min": 1, "max": "1" },
                    { "name": "date", "path": "Composition.date", "type": "dateTime",
                      "min": 1, "max": "1" },
                    { "name": "author", "path": "Composition.author", "type": "Reference",
                      "min": 1, "max": "*",
                      "targetProfiles": ["http://hl7.org/fhir/StructureDefinition/Practitioner"] },
                    { "name": "title", "path": "Composition.title", "type": "string",
                      "min": 1, "max": "1" },
                    { "name": "section", "path": "Composition.section",
                      "type": "Composition.Section", "min": 0, "max": "*" }
                ]
            },
            {
                "name": "Composition.Section",
                "kind": "backbone",
                "fields": [
                    { "name": "title", "path": "Composition.section.title", "type": "string",
                      "min": 0, "max": "1" },
                    { "name": "code", "path": "Composition.section.code", "type": "code",
                      "min": 0, "max": "1",
                      "binding": { "strength": "required",
                                   "codes": ["assessment", "plan", "history"] } },
                    { "name": "section", "path": "Composition.section.section",
                      "type": "Composition.Section", "min": 0, "max": "*" }
                ]
            },
            {
                "name": "DocumentReference",
                "kind": "resource",
                "fields": [
                    { "name": "status", "path": "DocumentReference.status", "type": "code",
                      "min": 1, "max": "1",
                      "binding": { "strength": "required",
                                   "codes": ["current", "superseded", "entered-in-error"] } },
                    { "name": "content", "path": "DocumentReference.content",
                      "type": "DocumentReference.Content", "min": 1, "max": "*" }
                ]
            },
            {
                "name": "DocumentReference.Content",
                "kind": "backbone",
                "fields": [
                    { "name": "attachment", "path": "DocumentReference.content.attachment",
                      "type": "Attachment", "min": 1, "max": "1" }
                ]
            },
            {
                "name": "Attachment",
                "kind": "complex",
                "fields": [
                    { "name": "contentType", "path": "Attachment.contentType", "type": "code",
                      "min": 0, "max": "1" },
                    { "name": "url", "path": "Attachment.url", "type": "url",
                      "min": 0, "max": "1" }
                ]
            },
            {
                "name": "MedicationRequest",
                "kind": "resource",
                "fields": [
                    { "name": "status", "path": "MedicationRequest.status", "type": "code",
                      "min": 1, "max": "1",
                      "binding": { "strength": "required",
                                   "codes": ["active", "on-hold", "cancelled", "completed"] } },
                    { "name": "medication", "path": "MedicationRequest.medication[x]",
                      "types": ["CodeableConcept", "Reference"], "min": 1, "max": "1" },
                    { "name": "reported", "path": "MedicationRequest.reported[x]",
                      "types": ["boolean", "Reference"], "min": 0, "max": "1" }
                ]
            },
            {
                "name": "CodeableConcept",
                "kind": "complex",
                "fields": [
                    { "name": "coding", "path": "CodeableConcept.coding", "type": "Coding",
                      "min": 0, "max": "*" },
                    { "name": "text", "path": "CodeableConcept.text", "type": "string",
                      "min": 0, "max": "1" }
                ]
            },
            {
                "name": "Coding",
                "kind": "complex",
                "fields": [
                    { "name": "system", "path": "Coding.system", "type": "uri",
                      "min": 0, "max": "1" },
                    { "name": "code", "path": "Coding.code", "type": "code",
                      "min": 0, "max": "1" },
                    { "name": "display", "path": "Coding.display", "type": "string",
                      "min": 0, "max": "1" }
                ]
            },
            {
                "name": "Reference",
                "kind": "complex",
                "fields": [
                    { "name": "reference", "path": "Reference.reference", "type": "string",
                      "min": 0, "max": "1" },
                    { "name": "display", "path": "Reference.display", "type": "string",
                      "min": 0, "max": "1" }
                ]
            }
        ]
    });
    Arc::new(load_document(&doc).unwrap())
}

fn validator() -> Validator {
    Validator::new(pack())
}

fn author() -> Instance {
    Instance::new("Reference").with("reference", "Practitioner/1")
}

fn visit_note_type() -> Instance {
    Instance::new("CodeableConcept").with_many(
        "coding",
        vec![Instance::new("Coding")
            .with("system", "http://loinc.org")
            .with("code", "11506-3")
            .into()],
    )
}

fn minimal_composition() -> Instance {
    Instance::new("Composition")
        .with("status", "final")
        .with("type", visit_note_type())
        .with("date", "2024-01-01")
        .with_many("author", vec![author().into()])
        .with("title", "Visit Note")
}

#[test]
fn minimal_composition_is_valid() {
    let outcome = validator().validate(&minimal_composition()).unwrap();
    assert!(outcome.valid, "unexpected issues: {:?}", outcome.issues);
    assert!(outcome.issues.is_empty());
}

#[test]
fn missing_required_status_is_always_caught() {
    let mut instance = minimal_composition();
    instance.remove("status");

    let outcome = validator().validate(&instance).unwrap();
    assert!(!outcome.valid);

    let cardinality: Vec<_> = outcome.issues_with(IssueCode::Cardinality).collect();
    assert_eq!(cardinality.len(), 1);
    assert_eq!(cardinality[0].path, "Composition.status");
    assert_eq!(cardinality[0].expected.as_deref(), Some("1..1"));
    assert_eq!(cardinality[0].actual.as_deref(), Some("0"));
}

#[test]
fn both_medication_variants_yield_exactly_one_conflict() {
    let mut instance = Instance::new("MedicationRequest");
    instance.set("status", "active");
    instance.set(
        "medicationCodeableConcept",
        Instance::new("CodeableConcept").with("text", "aspirin"),
    );
    instance.set(
        "medicationReference",
        Instance::new("Reference").with("reference", "Medication/42"),
    );

    let outcome = validator().validate(&instance).unwrap();
    let conflicts: Vec<_> = outcome.issues_with(IssueCode::ChoiceConflict).collect();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].path, "MedicationRequest.medication");
}

#[test]
fn primitive_choice_variant_is_type_checked() {
    let mut instance = Instance::new("MedicationRequest");
    instance.set("status", "active");
    instance.set(
        "medicationReference",
        Instance::new("Reference").with("reference", "Medication/42"),
    );
    // reportedBoolean must hold a boolean, not a string.
    instance.set("reportedBoolean", "yes");

    let outcome = validator().validate(&instance).unwrap();
    let mismatches: Vec<_> = outcome.issues_with(IssueCode::TypeMismatch).collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].path, "MedicationRequest.reportedBoolean");
}

#[test]
fn nested_sections_report_prefixed_paths() {
    let deep = Instance::new("Composition.Section")
        .with("title", "level three")
        .with("code", "not-in-set");
    let mid = Instance::new("Composition.Section").with_many("section", vec![deep.into()]);
    let top = Instance::new("Composition.Section").with_many("section", vec![mid.into()]);

    let mut instance = minimal_composition();
    instance.set_many("section", vec![top.into()]);

    let outcome = validator().validate(&instance).unwrap();
    let unbound: Vec<_> = outcome.issues_with(IssueCode::UnboundCode).collect();
    assert_eq!(unbound.len(), 1);
    assert_eq!(unbound[0].path, "Composition.section.section.section.code");
}

#[test]
fn binding_strength_controls_enforcement() {
    // Out-of-set code under a required binding: reported.
    let mut instance = minimal_composition();
    instance.set("status", "bogus");
    let outcome = validator().validate(&instance).unwrap();
    let unbound: Vec<_> = outcome.issues_with(IssueCode::UnboundCode).collect();
    assert_eq!(unbound.len(), 1);
    assert_eq!(unbound[0].path, "Composition.status");

    // The identical scenario under a preferred binding: silent.
    let mut instance = minimal_composition();
    instance.set("language", "tlh");
    let outcome = validator().validate(&instance).unwrap();
    assert!(outcome.valid, "preferred bindings must not report: {:?}", outcome.issues);
}

#[test]
fn zero_content_entries_is_one_cardinality_issue() {
    // Present-but-empty and absent both violate min = 1.
    for content in [Some(vec![]), None] {
        let mut instance = Instance::new("DocumentReference");
        instance.set("status", "current");
        if let Some(values) = content {
            instance.set_many("content", values);
        }

        let outcome = validator().validate(&instance).unwrap();
        let cardinality: Vec<_> = outcome.issues_with(IssueCode::Cardinality).collect();
        assert_eq!(cardinality.len(), 1);
        assert_eq!(cardinality[0].path, "DocumentReference.content");
    }
}

#[test]
fn cardinality_and_type_issues_are_independent() {
    let mut instance = minimal_composition();
    // Wrong kind on title, missing date: both must surface in one pass.
    instance.set("title", Value::Integer(7));
    instance.remove("date");

    let outcome = validator().validate(&instance).unwrap();
    assert_eq!(outcome.issues_with(IssueCode::TypeMismatch).count(), 1);
    assert_eq!(outcome.issues_with(IssueCode::Cardinality).count(), 1);
}

#[test]
fn invalid_date_format_is_reported_and_can_be_disabled() {
    let mut instance = minimal_composition();
    instance.set("date", "soon");

    let outcome = validator().validate(&instance).unwrap();
    let formats: Vec<_> = outcome.issues_with(IssueCode::InvalidFormat).collect();
    assert_eq!(formats.len(), 1);
    assert_eq!(formats[0].path, "Composition.date");

    let lenient = Validator::with_options(
        pack(),
        ValidatorOptions {
            check_primitive_formats: false,
        },
    );
    let outcome = lenient.validate(&instance).unwrap();
    assert!(outcome.valid);
}

#[test]
fn undeclared_fields_warn_on_extensible_types() {
    let mut instance = minimal_composition();
    instance.set("favouriteColour", "teal");

    let outcome = validator().validate(&instance).unwrap();
    // Extensible type: warning only, instance stays valid.
    assert!(outcome.valid);
    let unknown: Vec<_> = outcome.issues_with(IssueCode::UnknownElement).collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].path, "Composition.favouriteColour");
}

#[test]
fn unknown_type_is_fatal() {
    let err = validator().validate(&Instance::new("Observation")).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownType(name) if name == "Observation"));
}

#[test]
fn registry_is_shared_across_threads() {
    let registry = pack();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let validator = Validator::new(registry);
                validator.validate(&minimal_composition()).unwrap().valid
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
