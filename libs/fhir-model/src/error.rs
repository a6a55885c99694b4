//! Error types for instance manipulation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("field '{0}' is not a choice field")]
    NotAChoice(String),

    #[error("type '{variant}' is not a declared alternative of '{path}'")]
    UnknownVariant { path: String, variant: String },

    #[error(transparent)]
    Schema(#[from] stannum_schema::SchemaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
