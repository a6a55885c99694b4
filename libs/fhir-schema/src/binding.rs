//! Terminology bindings
//!
//! A binding associates a coded field with a set of permitted codes,
//! optionally partitioned by code-system URI, and a conformance strength.
//! Only `required` bindings are enforceable; weaker strengths are
//! documentation carried through for tooling.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Conformance strength of a terminology binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStrength {
    Required,
    Extensible,
    Preferred,
    Example,
}

impl BindingStrength {
    /// Only `required` bindings turn an out-of-set code into a validation error.
    pub fn is_enforced(&self) -> bool {
        matches!(self, Self::Required)
    }
}

impl FromStr for BindingStrength {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Self::Required),
            "extensible" => Ok(Self::Extensible),
            "preferred" => Ok(Self::Preferred),
            "example" => Ok(Self::Example),
            other => Err(SchemaError::InvalidBindingStrength(other.to_string())),
        }
    }
}

impl fmt::Display for BindingStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Required => "required",
            Self::Extensible => "extensible",
            Self::Preferred => "preferred",
            Self::Example => "example",
        };
        write!(f, "{}", s)
    }
}

/// Code sets not tied to a specific system live under this key.
pub(crate) const ANY_SYSTEM: &str = "";

/// A vocabulary constraint on a coded field.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub strength: BindingStrength,
    /// Canonical ValueSet URL, informational only (no terminology server here).
    pub value_set: Option<String>,
    /// Permitted codes keyed by code-system URI. System-less code lists are
    /// keyed by the empty string.
    codes: HashMap<String, HashSet<String>>,
}

impl Binding {
    pub fn new(strength: BindingStrength) -> Self {
        Self {
            strength,
            value_set: None,
            codes: HashMap::new(),
        }
    }

    pub fn with_value_set(mut self, value_set: impl Into<String>) -> Self {
        self.value_set = Some(value_set.into());
        self
    }

    /// Add a system-less list of permitted codes.
    pub fn with_codes<I, S>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_system_codes(ANY_SYSTEM, codes)
    }

    /// Add permitted codes for one code system.
    pub fn with_system_codes<I, S>(mut self, system: impl Into<String>, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.codes.entry(system.into()).or_default();
        entry.extend(codes.into_iter().map(Into::into));
        self
    }

    /// Whether any codes are enumerated at all. A binding without codes has
    /// nothing checkable locally (the value set lives on a terminology
    /// server, which is out of scope).
    pub fn has_codes(&self) -> bool {
        !self.codes.is_empty()
    }

    /// Whether `code` is permitted. With a known `system` the lookup is
    /// scoped to that system; without one, any system (including the
    /// system-less set) may supply the code.
    pub fn permits(&self, system: Option<&str>, code: &str) -> bool {
        if self.codes.is_empty() {
            return true;
        }
        match system {
            Some(sys) => self
                .codes
                .get(sys)
                .is_some_and(|set| set.contains(code)),
            None => self.codes.values().any(|set| set.contains(code)),
        }
    }

    /// Code systems with enumerated codes, for diagnostics.
    pub fn systems(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_round_trips_through_str() {
        for s in ["required", "extensible", "preferred", "example"] {
            let strength: BindingStrength = s.parse().unwrap();
            assert_eq!(strength.to_string(), s);
        }
        assert!("mandatory".parse::<BindingStrength>().is_err());
    }

    #[test]
    fn only_required_is_enforced() {
        assert!(BindingStrength::Required.is_enforced());
        assert!(!BindingStrength::Preferred.is_enforced());
        assert!(!BindingStrength::Example.is_enforced());
        assert!(!BindingStrength::Extensible.is_enforced());
    }

    #[test]
    fn permits_scoped_by_system() {
        let binding = Binding::new(BindingStrength::Required)
            .with_system_codes("http://hl7.org/fhir/composition-status", ["final", "amended"]);

        assert!(binding.permits(Some("http://hl7.org/fhir/composition-status"), "final"));
        assert!(!binding.permits(Some("http://hl7.org/fhir/composition-status"), "bogus"));
        assert!(!binding.permits(Some("http://example.org/other"), "final"));
        // Without a system the code may come from any system.
        assert!(binding.permits(None, "amended"));
    }

    #[test]
    fn empty_code_set_permits_everything() {
        let binding = Binding::new(BindingStrength::Required)
            .with_value_set("http://hl7.org/fhir/ValueSet/languages");
        assert!(!binding.has_codes());
        assert!(binding.permits(None, "anything"));
    }
}
