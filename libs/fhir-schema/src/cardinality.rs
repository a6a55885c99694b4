//! Field occurrence bounds

use std::fmt;

use crate::error::{Result, SchemaError};

/// Occurrence bounds on a field: `min..max`, where an unbounded max
/// (`"*"` in schema documents) is represented as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

impl Cardinality {
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// `0..1` - the default for optional scalar fields.
    pub const fn optional() -> Self {
        Self::new(0, Some(1))
    }

    /// `1..1` - a mandatory scalar field.
    pub const fn required() -> Self {
        Self::new(1, Some(1))
    }

    /// Parse from schema-document form: numeric `min` plus `"1"`/`"3"`/`"*"` max.
    pub fn parse(path: &str, min: u32, max: &str) -> Result<Self> {
        let max = match max {
            "*" => None,
            other => {
                let bound: u32 = other.parse().map_err(|_| {
                    SchemaError::InvalidDocument(format!(
                        "max cardinality at {path} must be a non-negative integer or '*', got '{other}'"
                    ))
                })?;
                Some(bound)
            }
        };

        if let Some(bound) = max {
            if min > bound {
                return Err(SchemaError::InvalidCardinality {
                    path: path.to_string(),
                    min,
                    max: bound,
                });
            }
        }

        Ok(Self::new(min, max))
    }

    /// Whether this field may hold more than one value.
    pub fn is_repeating(&self) -> bool {
        self.max.map_or(true, |m| m > 1)
    }

    /// Whether at least one value is mandatory.
    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    /// Whether `count` occurrences satisfy the bounds.
    pub fn admits(&self, count: usize) -> bool {
        if (count as u64) < u64::from(self.min) {
            return false;
        }
        match self.max {
            Some(bound) => count as u64 <= u64::from(bound),
            None => true,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(bound) => write!(f, "{}..{}", self.min, bound),
            None => write!(f, "{}..*", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bounded_and_unbounded_max() {
        let one = Cardinality::parse("Composition.status", 1, "1").unwrap();
        assert_eq!(one, Cardinality::required());
        assert!(!one.is_repeating());

        let many = Cardinality::parse("Composition.author", 1, "*").unwrap();
        assert_eq!(many.max, None);
        assert!(many.is_repeating());
        assert!(many.admits(500));
    }

    #[test]
    fn rejects_min_exceeding_max() {
        let err = Cardinality::parse("DocumentReference.content", 2, "1").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidCardinality { min: 2, max: 1, .. }
        ));
    }

    #[test]
    fn admits_counts_within_bounds() {
        let c = Cardinality::new(1, Some(3));
        assert!(!c.admits(0));
        assert!(c.admits(1));
        assert!(c.admits(3));
        assert!(!c.admits(4));
    }

    #[test]
    fn displays_in_schema_notation() {
        assert_eq!(Cardinality::new(0, Some(1)).to_string(), "0..1");
        assert_eq!(Cardinality::new(1, None).to_string(), "1..*");
    }
}
