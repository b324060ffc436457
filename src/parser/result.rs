use super::ParserConfig;
use serde::Serialize;

/// Smallest unit of segmented text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Exact substring of the (substituted) input
    pub text: String,
    /// Word vs. non-word classification
    pub is_word: bool,
    /// Marks the separator between two paragraphs
    pub paragraph_break: bool,
    /// 0-based sentence this token belongs to
    pub sentence_index: usize,
    /// Position within the whole result
    pub order: usize,
}

/// Ordered tokens plus sentence accounting, produced once per parse call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserResult {
    tokens: Vec<Token>,
    sentence_count: usize,
    language_id: Option<String>,
    right_to_left: bool,
}

impl ParserResult {
    /// All tokens in reading order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_count
    }

    /// Number of word tokens
    pub fn word_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_word).count()
    }

    /// Paragraphs are separated by break markers, so there is always one more
    pub fn paragraph_count(&self) -> usize {
        1 + self.tokens.iter().filter(|t| t.paragraph_break).count()
    }

    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    /// Carried from the config; token order stays logical
    pub fn is_right_to_left(&self) -> bool {
        self.right_to_left
    }

    /// Iterate word tokens only
    pub fn words(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_word)
    }

    /// Tokens belonging to one sentence
    pub fn sentence_tokens(&self, index: usize) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| t.sentence_index == index)
    }

    /// Text of each sentence, rebuilt from its tokens
    pub fn sentences(&self) -> Vec<String> {
        let mut sentences = vec![String::new(); self.sentence_count];
        for token in &self.tokens {
            if let Some(sentence) = sentences.get_mut(token.sentence_index) {
                sentence.push_str(&token.text);
            }
        }
        sentences
    }

    /// Concatenation of every token in order
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Accumulates tokens and sentence boundaries for a single parse call
pub(crate) struct ResultBuilder {
    tokens: Vec<Token>,
    sentence_count: usize,
    language_id: Option<String>,
    right_to_left: bool,
}

impl ResultBuilder {
    pub(crate) fn new(config: &ParserConfig) -> Self {
        Self {
            tokens: Vec::new(),
            sentence_count: 0,
            language_id: config.language_id().map(str::to_string),
            right_to_left: config.right_to_left(),
        }
    }

    /// Builder without language metadata (external output)
    pub(crate) fn bare() -> Self {
        Self {
            tokens: Vec::new(),
            sentence_count: 0,
            language_id: None,
            right_to_left: false,
        }
    }

    /// Open a new sentence; subsequent tokens belong to it
    pub(crate) fn begin_sentence(&mut self) {
        self.sentence_count += 1;
    }

    /// Whether the currently open sentence has received any token
    pub(crate) fn current_sentence_is_empty(&self) -> bool {
        match self.tokens.last() {
            Some(last) => last.sentence_index + 1 < self.sentence_count,
            None => true,
        }
    }

    pub(crate) fn push_word(&mut self, text: &str) {
        self.push(text, true, false);
    }

    pub(crate) fn push_non_word(&mut self, text: &str) {
        self.push(text, false, false);
    }

    pub(crate) fn push_paragraph_break(&mut self, text: &str) {
        self.push(text, false, true);
    }

    fn push(&mut self, text: &str, is_word: bool, paragraph_break: bool) {
        if self.sentence_count == 0 {
            self.begin_sentence();
        }
        let order = self.tokens.len();
        self.tokens.push(Token {
            text: text.to_string(),
            is_word,
            paragraph_break,
            sentence_index: self.sentence_count - 1,
            order,
        });
    }

    /// Freeze the result; there is always at least one sentence
    pub(crate) fn finish(self) -> ParserResult {
        ParserResult {
            tokens: self.tokens,
            sentence_count: self.sentence_count.max(1),
            language_id: self.language_id,
            right_to_left: self.right_to_left,
        }
    }
}
