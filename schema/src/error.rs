use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Descriptor decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("The type \"{0}\" is defined twice")]
    DuplicateType(String),
}
