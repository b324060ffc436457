use crate::allowlist::OutputFormat;
use crate::parser::{ParserResult, ResultBuilder};

/// Turn an external segmenter's stdout into a result.
///
/// Tokens are always words. Output is one sentence unless `blank_line_breaks`
/// is set for `line` output, in which case each blank line closes a sentence.
pub(crate) fn interpret(stdout: &str, format: OutputFormat, blank_line_breaks: bool) -> ParserResult {
    let mut builder = ResultBuilder::bare();
    builder.begin_sentence();

    match format {
        OutputFormat::Line => {
            let mut pending_break = false;
            for line in stdout.lines() {
                let token = line.trim();
                if token.is_empty() {
                    pending_break = blank_line_breaks;
                    continue;
                }
                if pending_break && !builder.current_sentence_is_empty() {
                    builder.begin_sentence();
                }
                pending_break = false;
                builder.push_word(token);
            }
        }
        OutputFormat::Wakati => {
            for token in stdout.split_whitespace() {
                builder.push_word(token);
            }
        }
    }

    builder.finish()
}
