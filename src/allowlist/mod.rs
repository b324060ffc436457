mod entry;
mod error;

#[cfg(test)]
mod tests;

pub use entry::{AllowlistEntry, InputMode, OutputFormat, ParserDefinition, DEFAULT_TIMEOUT_MS};
pub use error::AllowlistError;

use crate::parser::{CharacterParser, RegexParser};
use crate::security::{validate_parser_id, BinaryResolver};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

/// Immutable, process-wide table of externally invocable parsers
#[derive(Debug, Default)]
pub struct Allowlist {
    /// Load order
    entries: Vec<AllowlistEntry>,
    /// Identifier -> index into `entries`
    index: HashMap<String, usize>,
}

/// On-disk layout: `[parsers.<id>]` tables
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AllowlistFile {
    #[serde(default)]
    parsers: BTreeMap<String, ParserDefinition>,
}

/// Mutable builder that validates definitions before freezing them
pub struct AllowlistBuilder {
    entries: Vec<AllowlistEntry>,
    index: HashMap<String, usize>,
    require_binaries: bool,
    resolver: BinaryResolver,
}

impl AllowlistBuilder {
    /// Create a builder that keeps entries with missing binaries (marked unavailable)
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            require_binaries: false,
            resolver: BinaryResolver::from_env(),
        }
    }

    /// Reject entries whose binary does not exist or is not executable
    pub fn require_binaries(mut self, value: bool) -> Self {
        self.require_binaries = value;
        self
    }

    /// Use a specific resolver (search path) instead of the process PATH
    pub fn resolver(mut self, resolver: BinaryResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Validate and add one definition
    pub fn add(
        &mut self,
        id: &str,
        definition: ParserDefinition,
    ) -> Result<(), AllowlistError> {
        validate_parser_id(id)?;

        if id == RegexParser::ID || id == CharacterParser::ID {
            return Err(AllowlistError::InvalidId(format!(
                "'{}' is reserved for a built-in parser",
                id
            )));
        }
        if self.index.contains_key(id) {
            return Err(AllowlistError::Duplicate { id: id.to_string() });
        }
        if definition.name.trim().is_empty() {
            return Err(AllowlistError::InvalidDefinition {
                id: id.to_string(),
                reason: "name is empty".to_string(),
            });
        }
        if definition.timeout_ms == 0 {
            return Err(AllowlistError::InvalidDefinition {
                id: id.to_string(),
                reason: "timeout_ms must be positive".to_string(),
            });
        }
        if let Some(arg) = definition.args.iter().find(|a| a.contains('\0')) {
            return Err(AllowlistError::InvalidDefinition {
                id: id.to_string(),
                reason: format!("argument contains NUL: {:?}", arg),
            });
        }

        let resolution = self.resolver.resolve(&definition.binary);
        match &resolution {
            Ok(path) => info!(parser = %id, binary = %path.display(), "external parser allowed"),
            Err(reason) if self.require_binaries => {
                return Err(AllowlistError::BinaryUnavailable {
                    id: id.to_string(),
                    reason: reason.clone(),
                });
            }
            Err(reason) => warn!(parser = %id, %reason, "external parser binary unavailable"),
        }

        self.index.insert(id.to_string(), self.entries.len());
        self.entries.push(AllowlistEntry {
            id: id.to_string(),
            definition,
            resolution,
        });

        Ok(())
    }

    /// Add every `[parsers.<id>]` table from a TOML document
    pub fn load_toml_str(mut self, raw: &str) -> Result<Self, AllowlistError> {
        let file: AllowlistFile =
            toml::from_str(raw).map_err(|e| AllowlistError::Parse(e.to_string()))?;
        for (id, definition) in file.parsers {
            self.add(&id, definition)?;
        }
        Ok(self)
    }

    /// Read and add an allowlist file
    pub fn load_file(self, path: impl AsRef<Path>) -> Result<Self, AllowlistError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| AllowlistError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.load_toml_str(&raw)
    }

    /// Freeze the table
    pub fn build(self) -> Allowlist {
        Allowlist {
            entries: self.entries,
            index: self.index,
        }
    }
}

impl Default for AllowlistBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Allowlist {
    /// Allowlist with no external parsers
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and validate an allowlist file with default settings
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AllowlistError> {
        Ok(AllowlistBuilder::new().load_file(path)?.build())
    }

    pub fn get(&self, id: &str) -> Option<&AllowlistEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Identifiers in load order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn entries(&self) -> &[AllowlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
