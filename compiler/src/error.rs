use delphi_proto_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("The file \"{0}\" is not part of the descriptor set")]
    UnknownFile(String),

    #[error("The type \"{type_name}\" referenced by field \"{field}\" is not defined")]
    UnresolvedType {
        type_name: String,
        field:     String,
    },

    #[error("The type \"{type_name}\" cannot be declared: the name \"{name}\" is already taken")]
    NameCollision {
        type_name: String,
        name:      String,
    },

    #[error("Template variable \"{0}\" has no value")]
    UndefinedVariable(String),

    #[error("Generated unit is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
