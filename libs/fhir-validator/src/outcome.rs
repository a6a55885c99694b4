//! Validation results
//!
//! Issues are accumulated, never thrown: one validation pass returns every
//! problem it found so a caller fixing a bad payload sees all field errors
//! at once.

use serde_json::Value;
use std::fmt;

/// Validation result for a single instance.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub type_name: String,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    /// Issues matching a code, for targeted assertions and reporting.
    pub fn issues_with(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    /// Render as an OperationOutcome-shaped JSON document.
    pub fn to_operation_outcome(&self) -> Value {
        serde_json::json!({
            "resourceType": "OperationOutcome",
            "issue": self.issues.iter().map(ValidationIssue::to_json).collect::<Vec<_>>()
        })
    }
}

/// One problem found during validation, located by the declared field path.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub diagnostics: String,
    pub path: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, diagnostics: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code,
            diagnostics: diagnostics.into(),
            path: path.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn warning(code: IssueCode, diagnostics: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            ..Self::error(code, diagnostics, path)
        }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut issue = serde_json::json!({
            "severity": self.severity.to_string(),
            "code": self.code.to_string(),
            "diagnostics": self.diagnostics,
            "location": [self.path],
        });
        if let Some(ref expected) = self.expected {
            issue["expected"] = Value::String(expected.clone());
        }
        if let Some(ref actual) = self.actual {
            issue["actual"] = Value::String(actual.clone());
        }
        issue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
    Information,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "information",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    /// Occurrence count outside the declared `(min, max)` bounds.
    Cardinality,
    /// More than one alternative of a choice field is populated.
    ChoiceConflict,
    /// Coded value outside the permitted set of a required-strength binding.
    UnboundCode,
    /// Value kind disagrees with the declared field kind or type.
    TypeMismatch,
    /// Field not declared by the type (warning on extensible types).
    UnknownElement,
    /// Primitive value fails its lexical rules.
    InvalidFormat,
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cardinality => "cardinality",
            Self::ChoiceConflict => "choice-conflict",
            Self::UnboundCode => "unbound-code",
            Self::TypeMismatch => "type-mismatch",
            Self::UnknownElement => "unknown-element",
            Self::InvalidFormat => "invalid-format",
        };
        write!(f, "{}", s)
    }
}
