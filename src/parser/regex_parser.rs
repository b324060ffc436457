use super::result::ResultBuilder;
use super::{Parser, ParserConfig, ParserError, ParserResult};
use regex::Regex;
use std::sync::OnceLock;

/// Closing quotes and brackets that stay attached to a sentence terminator
const CLOSING_PUNCTUATION: &[char] = &[
    '"', '\'', ')', ']', '}', '»', '›', '”', '’', '」', '』', '）', '】', '〉', '》',
];

/// Blank line(s) between paragraphs
fn paragraph_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph separator pattern is valid"))
}

/// Built-in strategy: substitutions, paragraph and sentence splitting, then
/// word / non-word tokenization driven by the language's word class
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexParser;

impl RegexParser {
    pub const ID: &'static str = "regex";

    /// Segment `text`; never fails, empty input yields one empty sentence
    pub fn segment(&self, text: &str, config: &ParserConfig) -> ParserResult {
        let text = config.substitutions().apply(text);
        let mut builder = ResultBuilder::new(config);

        for (body, separator) in split_paragraphs(&text) {
            for sentence in split_sentences(body, config) {
                builder.begin_sentence();
                tokenize_sentence(sentence, config, &mut builder);
            }
            if let Some(separator) = separator {
                builder.push_paragraph_break(separator);
            }
        }

        builder.finish()
    }

    /// Segment raw bytes; invalid UTF-8 is replaced and tokenized as non-word text
    pub fn segment_bytes(&self, bytes: &[u8], config: &ParserConfig) -> ParserResult {
        self.segment(&String::from_utf8_lossy(bytes), config)
    }
}

impl Parser for RegexParser {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Regular expressions"
    }

    fn parse(&self, text: &str, config: &ParserConfig) -> Result<ParserResult, ParserError> {
        Ok(self.segment(text, config))
    }
}

/// Character-by-character strategy for scripts written without spaces
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterParser;

impl CharacterParser {
    pub const ID: &'static str = "character";

    pub fn segment(&self, text: &str, config: &ParserConfig) -> ParserResult {
        RegexParser.segment(text, &config.with_split_each_char())
    }
}

impl Parser for CharacterParser {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Character splitting"
    }

    fn parse(&self, text: &str, config: &ParserConfig) -> Result<ParserResult, ParserError> {
        Ok(self.segment(text, config))
    }
}

/// Split into `(body, separator)` pairs; only the last paragraph has no separator
fn split_paragraphs(text: &str) -> Vec<(&str, Option<&str>)> {
    let mut paragraphs = Vec::new();
    let mut start = 0;

    for m in paragraph_separator().find_iter(text) {
        paragraphs.push((&text[start..m.start()], Some(m.as_str())));
        start = m.end();
    }
    paragraphs.push((&text[start..], None));

    paragraphs
}

/// Split a paragraph into sentences; always returns at least one slice.
///
/// A sentence ends after a run of terminators, any closing punctuation that
/// follows them, and the whitespace after that. Exceptions and ASCII
/// terminators glued to a following word character (`3.14`) suppress the split.
fn split_sentences<'t>(paragraph: &'t str, config: &ParserConfig) -> Vec<&'t str> {
    let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
    let offset_at = |i: usize| chars.get(i).map_or(paragraph.len(), |&(pos, _)| pos);

    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !config.is_terminator(chars[i].1) {
            i += 1;
            continue;
        }

        let run_start = offset_at(i);
        let mut j = i;
        let mut all_ascii = true;
        while j < chars.len() && config.is_terminator(chars[j].1) {
            all_ascii &= chars[j].1.is_ascii();
            j += 1;
        }
        while j < chars.len() && CLOSING_PUNCTUATION.contains(&chars[j].1) {
            j += 1;
        }

        let glued = chars
            .get(j)
            .is_some_and(|&(_, next)| all_ascii && config.is_word_char(next));
        if glued {
            i = j;
            continue;
        }

        // Look back from the first terminator so abbreviations like "e.g." still match
        let first_terminator_end = offset_at(i + 1);
        let exception = config.exceptions().find_match(
            &paragraph[..run_start],
            &paragraph[..first_terminator_end],
            |c| config.is_word_char(c),
        );
        if exception.is_some() {
            i = j;
            continue;
        }

        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        let end = offset_at(j);
        sentences.push(&paragraph[start..end]);
        start = end;
        i = j;
    }

    if start < paragraph.len() || sentences.is_empty() {
        sentences.push(&paragraph[start..]);
    }

    sentences
}

/// Emit word runs and the non-word gaps between them
fn tokenize_sentence(sentence: &str, config: &ParserConfig, builder: &mut ResultBuilder) {
    let mut cursor = 0;

    for (start, end) in config.word_class().runs(sentence) {
        if start > cursor {
            emit_non_word(&sentence[cursor..start], config, builder);
        }
        let word = &sentence[start..end];
        if config.split_each_char() {
            for (pos, c) in word.char_indices() {
                builder.push_word(&word[pos..pos + c.len_utf8()]);
            }
        } else {
            builder.push_word(word);
        }
        cursor = end;
    }

    if cursor < sentence.len() {
        emit_non_word(&sentence[cursor..], config, builder);
    }
}

fn emit_non_word(text: &str, config: &ParserConfig, builder: &mut ResultBuilder) {
    if config.remove_spaces() && text.chars().all(char::is_whitespace) {
        return;
    }
    builder.push_non_word(text);
}
