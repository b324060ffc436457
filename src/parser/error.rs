use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building a [`ParserConfig`](super::ParserConfig)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Word character class is empty")]
    EmptyWordClass,

    #[error("Invalid word character class '{class}': {reason}")]
    InvalidWordClass { class: String, reason: String },

    #[error("Word character class '{0}' matches the empty string")]
    ZeroWidthWordClass(String),

    #[error("Invalid character substitution '{0}': expected old=new")]
    InvalidSubstitution(String),

    #[error("Failed to parse language settings: {0}")]
    Settings(String),
}

/// Why an external process did not produce usable output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionFailure {
    /// Process exited with a non-zero status (None when killed by a signal)
    NonZeroExit(Option<i32>),
    /// Hard timeout was reached and the process was killed
    TimedOut(Duration),
    /// The process could not be started
    Spawn(String),
    /// Reading or writing the process pipes / temp file failed
    Io(String),
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionFailure::NonZeroExit(Some(code)) => write!(f, "exited with status {}", code),
            ExecutionFailure::NonZeroExit(None) => write!(f, "terminated by signal"),
            ExecutionFailure::TimedOut(limit) => write!(f, "timed out after {:?}", limit),
            ExecutionFailure::Spawn(e) => write!(f, "failed to spawn: {}", e),
            ExecutionFailure::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

/// Errors returned by parser strategies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Parser '{id}' is unavailable: {reason}")]
    Unavailable { id: String, reason: String },

    #[error("Parser '{id}' failed: {failure}")]
    ExecutionFailed {
        id: String,
        failure: ExecutionFailure,
        /// Truncated stderr captured from the process
        stderr: String,
    },

    #[error("Parser '{id}' was cancelled")]
    Cancelled { id: String },
}

impl ParserError {
    pub(crate) fn unavailable(id: &str, reason: impl Into<String>) -> Self {
        ParserError::Unavailable {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the caller can reasonably fall back to the built-in regex parser
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ParserError::Cancelled { .. })
    }

    /// Identifier of the parser that produced this error
    pub fn parser_id(&self) -> &str {
        match self {
            ParserError::Unavailable { id, .. }
            | ParserError::ExecutionFailed { id, .. }
            | ParserError::Cancelled { id } => id,
        }
    }
}
