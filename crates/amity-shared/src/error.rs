use thiserror::Error;

/// Errors raised while turning an object value into a typed record.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Value does not match the {0} schema")]
    SchemaMismatch(&'static str),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
