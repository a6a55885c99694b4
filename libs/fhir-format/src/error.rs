//! Wire-format errors
//!
//! Structural parse failures abort immediately with no partial instance;
//! validity problems (cardinality, bindings) are not errors here - they
//! deserialize fine and belong to the validator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("expected a JSON object for {0}")]
    ExpectedObject(String),

    #[error("malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed XML document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unknown field '{field}' at {path}")]
    UnknownField { path: String, field: String },

    #[error("invalid value at {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("document declares type '{declared}' but '{expected}' was requested")]
    TypeMismatch { expected: String, declared: String },

    #[error(transparent)]
    Schema(#[from] stannum_schema::SchemaError),
}

impl FormatError {
    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
