//! Error types for schema loading and registry access

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("invalid schema document: {0}")]
    InvalidDocument(String),

    #[error("invalid cardinality at {path}: min {min} exceeds max {max}")]
    InvalidCardinality { path: String, min: u32, max: u32 },

    #[error("invalid binding strength '{0}' (expected required, extensible, preferred or example)")]
    InvalidBindingStrength(String),

    #[error("unresolved type reference '{target}' at {path}")]
    UnresolvedReference { path: String, target: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
