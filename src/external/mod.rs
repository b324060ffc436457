mod output;
mod process;


pub use process::CancelToken;

use crate::allowlist::{Allowlist, AllowlistEntry, InputMode};
use crate::parser::{ExecutionFailure, Parser, ParserConfig, ParserError, ParserResult};
use crate::security::is_executable;
use process::{Invocation, RunError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum stderr bytes attached to an execution error
pub const STDERR_EXCERPT_BYTES: usize = 2000;

/// Runs allowlisted external segmenters.
///
/// Only identifiers present in the allowlist can be run, and the argument
/// vector always comes from the allowlist entry; input text never reaches it.
pub struct ExternalParserAdapter {
    allowlist: Arc<Allowlist>,
    spawns: AtomicUsize,
}

impl ExternalParserAdapter {
    pub fn new(allowlist: Arc<Allowlist>) -> Self {
        Self {
            allowlist,
            spawns: AtomicUsize::new(0),
        }
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    /// Number of processes this adapter has attempted to start
    pub fn spawn_count(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }

    pub fn is_available(&self, parser_id: &str) -> bool {
        self.ready_entry(parser_id).is_ok()
    }

    pub fn availability_message(&self, parser_id: &str) -> String {
        match self.ready_entry(parser_id) {
            Ok(entry) => match entry.resolved_binary() {
                Some(path) => format!("Available ({})", path.display()),
                None => "Available".to_string(),
            },
            Err(ParserError::Unavailable { reason, .. }) => reason,
            Err(other) => other.to_string(),
        }
    }

    /// Run an allowlisted parser over `text`
    pub fn parse(&self, text: &str, parser_id: &str) -> Result<ParserResult, ParserError> {
        self.parse_with_cancel(text, parser_id, &CancelToken::new())
    }

    /// Like [`parse`](Self::parse), but cancelling `cancel` kills the process
    pub fn parse_with_cancel(
        &self,
        text: &str,
        parser_id: &str,
        cancel: &CancelToken,
    ) -> Result<ParserResult, ParserError> {
        let entry = self.ready_entry(parser_id)?;
        let definition = &entry.definition;
        let binary = entry
            .resolved_binary()
            .ok_or_else(|| ParserError::unavailable(parser_id, "binary was not resolved"))?;

        let invocation = match definition.input_mode {
            InputMode::Stdin => Invocation::stdin(binary, &definition.args, text),
            InputMode::File => Invocation::file(binary, &definition.args, text)
                .map_err(|e| self.run_error(parser_id, e))?,
        };

        self.spawns.fetch_add(1, Ordering::SeqCst);
        let finished = invocation
            .run(definition.timeout(), cancel)
            .map_err(|e| self.run_error(parser_id, e))?;

        if !finished.status.success() {
            let error = ParserError::ExecutionFailed {
                id: parser_id.to_string(),
                failure: ExecutionFailure::NonZeroExit(finished.status.code()),
                stderr: stderr_excerpt(&finished.stderr),
            };
            warn!(parser = %parser_id, error = %error, "external parser failed");
            return Err(error);
        }

        let stdout = String::from_utf8_lossy(&finished.stdout);
        let result = output::interpret(&stdout, definition.output_format, definition.blank_line_breaks);
        debug!(
            parser = %parser_id,
            tokens = result.token_count(),
            sentences = result.sentence_count(),
            "external parser finished"
        );

        Ok(result)
    }

    /// Allowlisted entry whose binary still exists and is executable
    fn ready_entry(&self, parser_id: &str) -> Result<&AllowlistEntry, ParserError> {
        let entry = self
            .allowlist
            .get(parser_id)
            .ok_or_else(|| ParserError::unavailable(parser_id, "parser is not in the allowlist"))?;

        match &entry.resolution {
            Ok(path) if is_executable(path) => Ok(entry),
            Ok(path) => Err(ParserError::unavailable(
                parser_id,
                format!("binary is no longer executable: {}", path.display()),
            )),
            Err(reason) => Err(ParserError::unavailable(parser_id, reason.clone())),
        }
    }

    fn run_error(&self, parser_id: &str, error: RunError) -> ParserError {
        let error = match error {
            RunError::Failed { failure, stderr } => ParserError::ExecutionFailed {
                id: parser_id.to_string(),
                failure,
                stderr: stderr_excerpt(&stderr),
            },
            RunError::Cancelled => ParserError::Cancelled {
                id: parser_id.to_string(),
            },
        };
        warn!(parser = %parser_id, error = %error, "external parser did not complete");
        error
    }
}

/// Lossy stderr, cut to [`STDERR_EXCERPT_BYTES`] on a char boundary
fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_EXCERPT_BYTES {
        return text.to_string();
    }
    let mut end = STDERR_EXCERPT_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

/// Registry-facing strategy bound to one allowlist identifier
pub struct ExternalParser {
    id: String,
    name: String,
    adapter: Arc<ExternalParserAdapter>,
}

impl ExternalParser {
    pub fn new(id: &str, adapter: Arc<ExternalParserAdapter>) -> Self {
        let name = adapter
            .allowlist()
            .get(id)
            .map(|e| e.definition.name.clone())
            .unwrap_or_else(|| id.to_string());
        Self {
            id: id.to_string(),
            name,
            adapter,
        }
    }
}

impl Parser for ExternalParser {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, text: &str, _config: &ParserConfig) -> Result<ParserResult, ParserError> {
        self.adapter.parse(text, &self.id)
    }

    fn is_available(&self) -> bool {
        self.adapter.is_available(&self.id)
    }

    fn availability_message(&self) -> String {
        self.adapter.availability_message(&self.id)
    }
}
