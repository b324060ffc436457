use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default hard limit for one external parser run
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// How text is handed to the external process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Written to stdin, which is then closed
    Stdin,
    /// Written to a temp file whose path is appended as the last argument
    File,
}

/// How the process's stdout is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One token per line
    Line,
    /// Whitespace-separated tokens
    Wakati,
}

/// Administrator-authored definition of one external parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserDefinition {
    pub name: String,
    /// Absolute path or a command name looked up on PATH
    pub binary: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub input_mode: InputMode,
    pub output_format: OutputFormat,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Start a new sentence at each blank line of `line` output
    #[serde(default)]
    pub blank_line_breaks: bool,
    /// Informational list of language codes
    #[serde(default)]
    pub languages: Vec<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ParserDefinition {
    pub fn new(
        name: impl Into<String>,
        binary: impl Into<String>,
        input_mode: InputMode,
        output_format: OutputFormat,
    ) -> Self {
        Self {
            name: name.into(),
            binary: binary.into(),
            args: Vec::new(),
            input_mode,
            output_format,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            blank_line_breaks: false,
            languages: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn blank_line_breaks(mut self, value: bool) -> Self {
        self.blank_line_breaks = value;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A validated definition plus the result of resolving its binary at load time
#[derive(Debug, Clone)]
pub struct AllowlistEntry {
    pub id: String,
    pub definition: ParserDefinition,
    /// Resolved executable, or the reason it could not be resolved
    pub resolution: Result<PathBuf, String>,
}

impl AllowlistEntry {
    pub fn resolved_binary(&self) -> Option<&PathBuf> {
        self.resolution.as_ref().ok()
    }
}
