use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unresolved type {type_name} given for {owner}")]
    UnresolvedType {
        type_name: String,
        owner:     String,
    },

    #[error("Malformed type entry for {owner}: {msg}")]
    MalformedType {
        owner: String,
        msg:   String,
    },

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Verifier error: {0}")]
    VerifierError(String),

    #[error("Invalid option {name}: {msg}")]
    InvalidOption {
        name: String,
        msg:  String,
    },
}
