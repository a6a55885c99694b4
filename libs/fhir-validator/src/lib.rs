//! Structural validation engine
//!
//! Validates generic instances against declarative type specifications:
//! - cardinality bounds, independently of type-correctness
//! - choice-field exclusivity (at most one populated alternative)
//! - required-strength terminology bindings over enumerated code sets
//! - kind agreement and recursive composite validation with path-prefixed
//!   issue locations
//! - optional primitive lexical checks
//!
//! Issues accumulate across the whole instance; validation never stops at
//! the first problem.

pub mod outcome;
mod steps;
pub mod validator;

pub use outcome::{IssueCode, IssueSeverity, ValidationIssue, ValidationOutcome};
pub use validator::{Validator, ValidatorOptions};
