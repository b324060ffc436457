mod config;
mod error;
mod regex_parser;
mod registry;
mod result;

#[cfg(test)]
mod tests;

pub use config::{
    LanguageSettings, ParserConfig, ParserConfigBuilder, RuleList, SentenceExceptions,
    Substitutions, WordClass, DEFAULT_SENTENCE_TERMINATORS, DEFAULT_WORD_CHARACTERS,
};
pub use error::{ConfigError, ExecutionFailure, ParserError};
pub use regex_parser::{CharacterParser, RegexParser};
pub use registry::{ParserInfo, ParserRegistry};
pub use result::{ParserResult, Token};
pub(crate) use result::ResultBuilder;

/// Core trait that every segmentation strategy implements
pub trait Parser: Send + Sync {
    /// Stable identifier used for routing (e.g. "regex", "mecab")
    fn id(&self) -> &str;

    /// Human-readable name for diagnostics
    fn name(&self) -> &str;

    /// Segment text into sentences and tokens
    ///
    /// # Arguments
    /// * `text` - Raw language text
    /// * `config` - Per-language settings
    fn parse(&self, text: &str, config: &ParserConfig) -> Result<ParserResult, ParserError>;

    /// Whether the strategy can run right now
    fn is_available(&self) -> bool {
        true
    }

    /// Diagnostic explaining the availability state
    fn availability_message(&self) -> String {
        if self.is_available() {
            "Available".to_string()
        } else {
            "Unavailable".to_string()
        }
    }
}
