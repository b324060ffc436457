//! Text segmentation engine
//!
//! Turns raw language text into sentences and tokens under a per-language
//! [`ParserConfig`], using either the built-in regex strategy, character
//! splitting, or an administrator-allowlisted external segmenter.
//!
//! # Example
//!
//! ```rust
//! use wordsplit::{ParserConfig, ParserRegistry};
//!
//! let config = ParserConfig::builder()
//!     .exceptions("Mr.|Dr.")
//!     .build()
//!     .unwrap();
//! let registry = ParserRegistry::builtin();
//!
//! let result = registry.parse("regex", "Mr. Jones is here. He left.", &config).unwrap();
//! assert_eq!(result.sentence_count(), 2);
//! ```

// Public API exports
pub mod allowlist;
pub mod external;
pub mod nlp;
pub mod parser;
pub mod security;

// Re-export main types for convenience
pub use allowlist::{
    Allowlist, AllowlistBuilder, AllowlistEntry, AllowlistError, InputMode, OutputFormat,
    ParserDefinition,
};
pub use external::{CancelToken, ExternalParser, ExternalParserAdapter};
pub use nlp::{NlpClient, NlpClientConfig};
pub use parser::{
    CharacterParser, ConfigError, ExecutionFailure, LanguageSettings, Parser, ParserConfig,
    ParserConfigBuilder, ParserError, ParserInfo, ParserRegistry, ParserResult, RegexParser, Token,
};
pub use security::BinaryResolver;
