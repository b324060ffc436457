use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllowlistError {
    #[error("Failed to read allowlist file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse allowlist: {0}")]
    Parse(String),

    #[error("Invalid parser identifier: {0}")]
    InvalidId(String),

    #[error("Parser '{id}' is defined more than once")]
    Duplicate { id: String },

    #[error("Parser '{id}' has an invalid definition: {reason}")]
    InvalidDefinition { id: String, reason: String },

    #[error("Parser '{id}' binary cannot be used: {reason}")]
    BinaryUnavailable { id: String, reason: String },
}
