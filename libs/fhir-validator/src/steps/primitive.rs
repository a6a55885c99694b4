//! Primitive lexical rules
//!
//! FHIR primitive types constrain their lexical form (id length/alphabet,
//! date precision, base64 alphabet, ...). These checks apply to values that
//! already agree with the declared JSON kind; kind disagreement is reported
//! as a type mismatch by the walk, not here.

use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;

use stannum_model::Value;

use crate::outcome::{IssueCode, ValidationIssue};

/// Compiled patterns, built once per validator.
pub(crate) struct PrimitiveChecks {
    id: Regex,
    code: Regex,
    oid: Regex,
    uuid: Regex,
    base64: Regex,
    partial_date: Regex,
}

impl PrimitiveChecks {
    pub(crate) fn new() -> Self {
        Self {
            // [A-Za-z0-9\-\.]{1,64}
            id: Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").unwrap(),
            // no leading/trailing/double whitespace
            code: Regex::new(r"^[^\s]+(\s[^\s]+)*$").unwrap(),
            oid: Regex::new(r"^urn:oid:[0-2](\.(0|[1-9][0-9]*))+$").unwrap(),
            uuid: Regex::new(
                r"^urn:uuid:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
            )
            .unwrap(),
            base64: Regex::new(r"^(\s*[A-Za-z0-9+/=])*\s*$").unwrap(),
            // YYYY or YYYY-MM partial dates
            partial_date: Regex::new(r"^\d{4}(-(0[1-9]|1[0-2]))?$").unwrap(),
        }
    }

    /// Check one value against the lexical rules of its primitive type
    /// code. Unrecognized codes (extensions of the type system) pass.
    pub(crate) fn check(
        &self,
        value: &Value,
        type_code: &str,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        match type_code {
            "positiveInt" => {
                if let Value::Integer(i) = value {
                    if *i < 1 {
                        issues.push(invalid(path, type_code, &i.to_string(), "must be >= 1"));
                    }
                }
            }
            "unsignedInt" => {
                if let Value::Integer(i) = value {
                    if *i < 0 {
                        issues.push(invalid(path, type_code, &i.to_string(), "must be >= 0"));
                    }
                }
            }
            _ => {
                if let Value::String(s) = value {
                    self.check_string(s, type_code, path, issues);
                }
            }
        }
    }

    fn check_string(&self, s: &str, type_code: &str, path: &str, issues: &mut Vec<ValidationIssue>) {
        let ok = match type_code {
            "id" => self.id.is_match(s),
            "code" => self.code.is_match(s),
            "oid" => self.oid.is_match(s),
            "uuid" => self.uuid.is_match(s),
            "base64Binary" => self.base64.is_match(s),
            "uri" | "url" | "canonical" => !s.is_empty() && !s.contains(char::is_whitespace),
            "date" => self.is_date(s),
            "dateTime" => self.is_datetime(s),
            "instant" => DateTime::parse_from_rfc3339(s).is_ok(),
            "time" => is_time(s),
            // string, markdown, xhtml and unrecognized codes carry no
            // lexical rule beyond being a string.
            _ => true,
        };

        if !ok {
            issues.push(invalid(path, type_code, s, "does not match the type's lexical form"));
        }
    }

    fn is_date(&self, s: &str) -> bool {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() || self.partial_date.is_match(s)
    }

    fn is_datetime(&self, s: &str) -> bool {
        DateTime::parse_from_rfc3339(s).is_ok() || self.is_date(s)
    }
}

fn is_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f").is_ok()
}

fn invalid(path: &str, type_code: &str, actual: &str, detail: &str) -> ValidationIssue {
    ValidationIssue::error(
        IssueCode::InvalidFormat,
        format!("invalid {} value: {}", type_code, detail),
        path,
    )
    .with_expected(type_code.to_string())
    .with_actual(actual.to_string())
}
