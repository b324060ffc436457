use super::{CharacterParser, Parser, ParserConfig, ParserError, ParserResult, RegexParser};
use crate::allowlist::Allowlist;
use crate::external::{ExternalParser, ExternalParserAdapter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Availability row for diagnostic display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserInfo {
    pub id: String,
    pub name: String,
    pub available: bool,
    pub message: String,
}

/// Closed dispatch table from parser identifier to strategy
pub struct ParserRegistry {
    /// Registration order, used for listing
    parsers: Vec<Box<dyn Parser>>,
    /// Identifier -> index into `parsers`
    index: HashMap<String, usize>,
}

impl ParserRegistry {
    /// Registry with only the built-in `regex` and `character` strategies
    pub fn builtin() -> Self {
        let mut registry = Self {
            parsers: Vec::new(),
            index: HashMap::new(),
        };
        registry.register(RegexParser);
        registry.register(CharacterParser);
        registry
    }

    /// Built-ins plus one strategy per allowlist entry
    pub fn with_allowlist(allowlist: Arc<Allowlist>) -> Self {
        let mut registry = Self::builtin();
        let adapter = Arc::new(ExternalParserAdapter::new(allowlist));
        for id in adapter.allowlist().ids() {
            registry.register(ExternalParser::new(id, Arc::clone(&adapter)));
        }
        registry
    }

    /// Later registrations never replace an existing identifier
    fn register(&mut self, parser: impl Parser + 'static) {
        let id = parser.id().to_string();
        if self.index.contains_key(&id) {
            warn!(parser = %id, "ignoring duplicate parser registration");
            return;
        }
        self.index.insert(id, self.parsers.len());
        self.parsers.push(Box::new(parser));
    }

    /// Look up a strategy by identifier
    pub fn resolve(&self, id: &str) -> Option<&dyn Parser> {
        self.index.get(id).map(|&i| &*self.parsers[i])
    }

    /// Resolve and run a strategy; unknown identifiers are reported as unavailable
    pub fn parse(
        &self,
        id: &str,
        text: &str,
        config: &ParserConfig,
    ) -> Result<ParserResult, ParserError> {
        let parser = self
            .resolve(id)
            .ok_or_else(|| ParserError::unavailable(id, "no such parser is registered"))?;
        debug!(parser = %id, bytes = text.len(), "parsing text");
        parser.parse(text, config)
    }

    /// Run the parser the language asks for, defaulting to `regex`
    pub fn parse_configured(
        &self,
        text: &str,
        config: &ParserConfig,
    ) -> Result<ParserResult, ParserError> {
        self.parse(config.parser_type().unwrap_or(RegexParser::ID), text, config)
    }

    /// Run `id`, falling back to the regex parser on recoverable failures
    pub fn parse_or_fallback(
        &self,
        id: &str,
        text: &str,
        config: &ParserConfig,
    ) -> Result<ParserResult, ParserError> {
        match self.parse(id, text, config) {
            Err(e) if e.is_recoverable() && id != RegexParser::ID => {
                warn!(parser = %id, error = %e, "falling back to regex parser");
                Ok(RegexParser.segment(text, config))
            }
            other => other,
        }
    }

    /// Availability of every registered strategy, in registration order
    pub fn list_available(&self) -> Vec<ParserInfo> {
        self.parsers
            .iter()
            .map(|p| ParserInfo {
                id: p.id().to_string(),
                name: p.name().to_string(),
                available: p.is_available(),
                message: p.availability_message(),
            })
            .collect()
    }

    /// Number of registered parsers
    pub fn parser_count(&self) -> usize {
        self.parsers.len()
    }

    /// All registered identifiers, in registration order
    pub fn registered_ids(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.id()).collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
