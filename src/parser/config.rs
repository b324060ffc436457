use super::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Default sentence terminators used when a language does not override them
pub const DEFAULT_SENTENCE_TERMINATORS: &str = ".!?";

/// Latin letters plus common diacritics
pub const DEFAULT_WORD_CHARACTERS: &str = "a-zA-Z\\x{C0}-\\x{D6}\\x{D8}-\\x{F6}\\x{F8}-\\x{24F}";

/// Immutable per-language configuration for a parse call
#[derive(Debug, Clone)]
pub struct ParserConfig {
    language_id: Option<String>,
    parser_type: Option<String>,
    terminators: BTreeSet<char>,
    exceptions: SentenceExceptions,
    word_class: WordClass,
    substitutions: Substitutions,
    remove_spaces: bool,
    split_each_char: bool,
    right_to_left: bool,
}

impl ParserConfig {
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::new()
    }

    /// Load and validate a TOML language settings file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Settings(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: LanguageSettings =
            toml::from_str(raw).map_err(|e| ConfigError::Settings(e.to_string()))?;
        Self::try_from(settings)
    }

    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    /// Parser identifier the language asks for, if any
    pub fn parser_type(&self) -> Option<&str> {
        self.parser_type.as_deref()
    }

    pub fn is_terminator(&self, c: char) -> bool {
        self.terminators.contains(&c)
    }

    pub fn terminators(&self) -> impl Iterator<Item = char> + '_ {
        self.terminators.iter().copied()
    }

    pub fn exceptions(&self) -> &SentenceExceptions {
        &self.exceptions
    }

    pub fn word_class(&self) -> &WordClass {
        &self.word_class
    }

    pub fn is_word_char(&self, c: char) -> bool {
        self.word_class.contains(c)
    }

    pub fn substitutions(&self) -> &Substitutions {
        &self.substitutions
    }

    pub fn remove_spaces(&self) -> bool {
        self.remove_spaces
    }

    pub fn split_each_char(&self) -> bool {
        self.split_each_char
    }

    pub fn right_to_left(&self) -> bool {
        self.right_to_left
    }

    /// Same configuration with character splitting forced on
    pub fn with_split_each_char(&self) -> Self {
        Self {
            split_each_char: true,
            ..self.clone()
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            language_id: None,
            parser_type: None,
            terminators: DEFAULT_SENTENCE_TERMINATORS.chars().collect(),
            exceptions: SentenceExceptions::default(),
            word_class: WordClass::default(),
            substitutions: Substitutions::default(),
            remove_spaces: false,
            split_each_char: false,
            right_to_left: false,
        }
    }
}

/// Builder for [`ParserConfig`]; validation happens in [`build`](Self::build)
#[derive(Debug, Clone)]
pub struct ParserConfigBuilder {
    language_id: Option<String>,
    parser_type: Option<String>,
    split_sentences: String,
    exceptions: Vec<String>,
    word_characters: String,
    substitutions: Vec<String>,
    remove_spaces: bool,
    split_each_char: bool,
    right_to_left: bool,
}

impl ParserConfigBuilder {
    pub fn new() -> Self {
        Self {
            language_id: None,
            parser_type: None,
            split_sentences: DEFAULT_SENTENCE_TERMINATORS.to_string(),
            exceptions: Vec::new(),
            word_characters: DEFAULT_WORD_CHARACTERS.to_string(),
            substitutions: Vec::new(),
            remove_spaces: false,
            split_each_char: false,
            right_to_left: false,
        }
    }

    pub fn language_id(mut self, id: impl Into<String>) -> Self {
        self.language_id = Some(id.into());
        self
    }

    pub fn parser_type(mut self, id: impl Into<String>) -> Self {
        self.parser_type = Some(id.into());
        self
    }

    /// Characters that end a sentence, e.g. `.!?`
    pub fn split_sentences(mut self, chars: impl Into<String>) -> Self {
        self.split_sentences = chars.into();
        self
    }

    /// Pipe-delimited exceptions, e.g. `Mr.|Dr.|St.`
    pub fn exceptions(mut self, pipe_delimited: &str) -> Self {
        self.exceptions = split_pipe(pipe_delimited);
        self
    }

    pub fn exception_list<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exceptions = entries.into_iter().map(Into::into).collect();
        self
    }

    /// Character class body (`a-zA-Z`) or bracketed class (`[a-zA-Z]`)
    pub fn word_characters(mut self, class: impl Into<String>) -> Self {
        self.word_characters = class.into();
        self
    }

    /// Pipe-delimited `old=new` rules
    pub fn substitutions(mut self, pipe_delimited: &str) -> Self {
        self.substitutions = split_pipe(pipe_delimited);
        self
    }

    pub fn substitution_list<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.substitutions = rules.into_iter().map(Into::into).collect();
        self
    }

    pub fn remove_spaces(mut self, value: bool) -> Self {
        self.remove_spaces = value;
        self
    }

    pub fn split_each_char(mut self, value: bool) -> Self {
        self.split_each_char = value;
        self
    }

    pub fn right_to_left(mut self, value: bool) -> Self {
        self.right_to_left = value;
        self
    }

    pub fn build(self) -> Result<ParserConfig, ConfigError> {
        let word_class = WordClass::new(&self.word_characters)?;
        let substitutions = Substitutions::parse(&self.substitutions)?;

        Ok(ParserConfig {
            language_id: self.language_id,
            parser_type: self.parser_type,
            terminators: parse_terminators(&self.split_sentences),
            exceptions: SentenceExceptions::new(self.exceptions),
            word_class,
            substitutions,
            remove_spaces: self.remove_spaces,
            split_each_char: self.split_each_char,
            right_to_left: self.right_to_left,
        })
    }
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Backslashes are accepted as escapes and ignored
fn parse_terminators(raw: &str) -> BTreeSet<char> {
    raw.chars().filter(|&c| c != '\\').collect()
}

fn split_pipe(raw: &str) -> Vec<String> {
    raw.split('|')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compiled word-character class
#[derive(Debug, Clone)]
pub struct WordClass {
    source: String,
    single: Regex,
    runs: Regex,
}

impl WordClass {
    pub fn new(class: &str) -> Result<Self, ConfigError> {
        let trimmed = class.trim();
        if trimmed.is_empty() || trimmed == "[]" {
            return Err(ConfigError::EmptyWordClass);
        }

        let body = if trimmed.starts_with('[') && trimmed.ends_with(']') {
            trimmed.to_string()
        } else {
            format!("[{}]", trimmed)
        };

        let invalid = |e: regex::Error| ConfigError::InvalidWordClass {
            class: class.to_string(),
            reason: e.to_string(),
        };
        let single = Regex::new(&format!("^(?:{})$", body)).map_err(invalid)?;
        let runs = Regex::new(&format!("(?:{})+", body)).map_err(invalid)?;

        if single.is_match("") {
            return Err(ConfigError::ZeroWidthWordClass(class.to_string()));
        }

        Ok(Self {
            source: class.to_string(),
            single,
            runs,
        })
    }

    pub fn contains(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.single.is_match(c.encode_utf8(&mut buf))
    }

    /// Byte ranges of maximal word runs in `text`
    pub fn runs<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.runs.find_iter(text).map(|m| (m.start(), m.end()))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for WordClass {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_CHARACTERS).expect("default word class is valid")
    }
}

/// Ordered literal find/replace rules applied before splitting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    rules: Vec<(String, String)>,
}

impl Substitutions {
    pub fn parse<S: AsRef<str>>(rules: &[S]) -> Result<Self, ConfigError> {
        let mut parsed = Vec::with_capacity(rules.len());
        for rule in rules {
            let rule = rule.as_ref();
            let (old, new) = rule
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidSubstitution(rule.to_string()))?;
            if old.is_empty() {
                return Err(ConfigError::InvalidSubstitution(rule.to_string()));
            }
            parsed.push((old.to_string(), new.to_string()));
        }
        Ok(Self { rules: parsed })
    }

    /// Apply every rule in declared order; later rules see earlier output
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, (old, new)| acc.replace(old.as_str(), new))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Literal strings that keep a terminator from ending a sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceExceptions {
    /// Sorted longest first
    entries: Vec<String>,
}

impl SentenceExceptions {
    pub fn new(entries: Vec<String>) -> Self {
        let mut entries: Vec<String> = entries
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        entries.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        entries.dedup();
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest entry ending `with_terminator` (entry includes the terminator)
    /// or `before_terminator` (entry without it), starting at a word boundary
    pub fn find_match<F>(
        &self,
        before_terminator: &str,
        with_terminator: &str,
        is_word_char: F,
    ) -> Option<&str>
    where
        F: Fn(char) -> bool,
    {
        self.entries
            .iter()
            .find(|entry| {
                [with_terminator, before_terminator].into_iter().any(|prefix| {
                    prefix.ends_with(entry.as_str())
                        && prefix[..prefix.len() - entry.len()]
                            .chars()
                            .next_back()
                            .map_or(true, |c| !is_word_char(c))
                })
            })
            .map(String::as_str)
    }
}

/// Serialized form of a language's parsing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSettings {
    #[serde(default)]
    pub language_id: Option<String>,
    #[serde(default)]
    pub parser_type: Option<String>,
    #[serde(default = "default_split_sentences")]
    pub regexp_split_sentences: String,
    #[serde(default)]
    pub exceptions_split_sentences: RuleList,
    #[serde(default = "default_word_characters")]
    pub regexp_word_characters: String,
    #[serde(default)]
    pub character_substitutions: RuleList,
    #[serde(default)]
    pub remove_spaces: bool,
    #[serde(default)]
    pub split_each_char: bool,
    #[serde(default)]
    pub right_to_left: bool,
}

fn default_split_sentences() -> String {
    DEFAULT_SENTENCE_TERMINATORS.to_string()
}

fn default_word_characters() -> String {
    DEFAULT_WORD_CHARACTERS.to_string()
}

/// Either a pipe-delimited string or an explicit list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleList {
    Piped(String),
    List(Vec<String>),
}

impl Default for RuleList {
    fn default() -> Self {
        RuleList::List(Vec::new())
    }
}

impl RuleList {
    fn into_vec(self) -> Vec<String> {
        match self {
            RuleList::Piped(raw) => split_pipe(&raw),
            RuleList::List(items) => items,
        }
    }
}

impl TryFrom<LanguageSettings> for ParserConfig {
    type Error = ConfigError;

    fn try_from(settings: LanguageSettings) -> Result<Self, Self::Error> {
        let mut builder = ParserConfigBuilder::new()
            .split_sentences(settings.regexp_split_sentences)
            .exception_list(settings.exceptions_split_sentences.into_vec())
            .word_characters(settings.regexp_word_characters)
            .substitution_list(settings.character_substitutions.into_vec())
            .remove_spaces(settings.remove_spaces)
            .split_each_char(settings.split_each_char)
            .right_to_left(settings.right_to_left);

        if let Some(id) = settings.language_id {
            builder = builder.language_id(id);
        }
        if let Some(parser) = settings.parser_type {
            builder = builder.parser_type(parser);
        }
        builder.build()
    }
}
