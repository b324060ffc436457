#[cfg(test)]
mod tests {
    use crate::parser::{SentenceExceptions, Substitutions, WordClass};
    use crate::{
        AllowlistBuilder, CharacterParser, ConfigError, InputMode, OutputFormat, Parser,
        ParserConfig, ParserDefinition, ParserError, ParserRegistry, RegexParser,
    };
    use std::sync::Arc;

    fn english() -> ParserConfig {
        ParserConfig::builder()
            .language_id("en")
            .exceptions("Mr.|Dr.|e.g.")
            .build()
            .unwrap()
    }

    fn japanese() -> ParserConfig {
        ParserConfig::builder()
            .language_id("ja")
            .split_sentences("。！？")
            .word_characters("\\x{3040}-\\x{30FF}\\x{4E00}-\\x{9FFF}")
            .split_each_char(true)
            .build()
            .unwrap()
    }

    fn texts(result: &crate::ParserResult) -> Vec<&str> {
        result.tokens().iter().map(|t| t.text.as_str()).collect()
    }

    // ========================================================================
    // Sentence Splitting Tests
    // ========================================================================

    #[test]
    fn test_empty_input_is_one_empty_sentence() {
        let result = RegexParser.segment("", &english());
        assert_eq!(result.sentence_count(), 1);
        assert_eq!(result.token_count(), 0);
        assert_eq!(result.paragraph_count(), 1);
    }

    #[test]
    fn test_two_sentences() {
        let result = RegexParser.segment("The cat sat. The dog ran!", &english());
        assert_eq!(result.sentence_count(), 2);
        assert_eq!(result.sentences(), vec!["The cat sat. ", "The dog ran!"]);
    }

    #[test]
    fn test_exception_keeps_sentence_together() {
        let result = RegexParser.segment("Mr. Jones is here. He left.", &english());
        assert_eq!(result.sentence_count(), 2);

        let first: Vec<&str> = result
            .sentence_tokens(0)
            .filter(|t| t.is_word)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(first, vec!["Mr", "Jones", "is", "here"]);
    }

    #[test]
    fn test_exception_with_inner_terminators() {
        let result = RegexParser.segment("Use tools, e.g. hammers. Done.", &english());
        assert_eq!(result.sentence_count(), 2);
        assert_eq!(result.sentences()[1], "Done.");
    }

    #[test]
    fn test_exception_requires_word_boundary() {
        let config = ParserConfig::builder().exceptions("r.").build().unwrap();
        let result = RegexParser.segment("Mr. Smith", &config);
        assert_eq!(result.sentence_count(), 2);
    }

    #[test]
    fn test_terminator_run_and_closing_quote() {
        let result = RegexParser.segment("Really?! He said \"Stop.\" Then he left.", &english());
        assert_eq!(
            result.sentences(),
            vec!["Really?! ", "He said \"Stop.\" ", "Then he left."]
        );
    }

    #[test]
    fn test_terminator_glued_to_word_does_not_split() {
        let result = RegexParser.segment("Visit example.com today. Thanks.", &english());
        assert_eq!(result.sentence_count(), 2);

        let config = ParserConfig::builder()
            .word_characters("a-zA-Z0-9")
            .build()
            .unwrap();
        let result = RegexParser.segment("Pi is 3.14 today.", &config);
        assert_eq!(result.sentence_count(), 1);
        assert!(result.words().any(|t| t.text == "14"));
    }

    #[test]
    fn test_trailing_text_without_terminator() {
        let result = RegexParser.segment("Done. and then", &english());
        assert_eq!(result.sentence_count(), 2);
        assert_eq!(result.sentences()[1], "and then");
    }

    // ========================================================================
    // Tokenization Tests
    // ========================================================================

    #[test]
    fn test_tokens_alternate_words_and_gaps() {
        let result = RegexParser.segment("Hello, world.", &english());
        assert_eq!(texts(&result), vec!["Hello", ", ", "world", "."]);
        assert_eq!(result.word_count(), 2);

        let orders: Vec<usize> = result.tokens().iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_diacritics_are_word_characters() {
        let result = RegexParser.segment("Ça coûte très cher.", &english());
        let words: Vec<&str> = result.words().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Ça", "coûte", "très", "cher"]);
    }

    #[test]
    fn test_text_round_trips() {
        let input = "First line here. Second one?\n\n  Next paragraph, with \"quotes\"!\nEnd";
        let result = RegexParser.segment(input, &english());
        assert_eq!(result.text(), input);
        assert_eq!(result.sentences().concat(), input);
    }

    #[test]
    fn test_remove_spaces_drops_whitespace_tokens() {
        let config = ParserConfig::builder().remove_spaces(true).build().unwrap();
        let result = RegexParser.segment("Hello world. Bye.", &config);
        assert_eq!(texts(&result), vec!["Hello", "world", ". ", "Bye", "."]);
    }

    #[test]
    fn test_split_each_char_cjk() {
        let result = RegexParser.segment("日本語", &japanese());
        assert_eq!(texts(&result), vec!["日", "本", "語"]);
        assert!(result.tokens().iter().all(|t| t.is_word));
    }

    #[test]
    fn test_cjk_terminators() {
        let result = RegexParser.segment("私は学生です。あなたは？", &japanese());
        assert_eq!(result.sentence_count(), 2);
        assert_eq!(result.word_count(), 10);
        assert_eq!(result.token_count(), 12);
        assert_eq!(result.sentences(), vec!["私は学生です。", "あなたは？"]);
    }

    #[test]
    fn test_character_parser_forces_split() {
        let config = ParserConfig::default();
        let result = CharacterParser.segment("abc de", &config);
        assert_eq!(texts(&result), vec!["a", "b", "c", " ", "d", "e"]);
    }

    // ========================================================================
    // Paragraph Tests
    // ========================================================================

    #[test]
    fn test_paragraph_break_marker() {
        let result = RegexParser.segment("First para.\n\nSecond para.", &english());
        assert_eq!(result.sentence_count(), 2);
        assert_eq!(result.paragraph_count(), 2);

        let marker = result
            .tokens()
            .iter()
            .find(|t| t.paragraph_break)
            .unwrap();
        assert_eq!(marker.text, "\n\n");
        assert!(!marker.is_word);
        assert_eq!(marker.sentence_index, 0);
    }

    #[test]
    fn test_paragraph_break_kept_with_remove_spaces() {
        let config = ParserConfig::builder().remove_spaces(true).build().unwrap();
        let result = RegexParser.segment("One.\n \nTwo.", &config);
        assert_eq!(result.paragraph_count(), 2);
        assert!(result.tokens().iter().any(|t| t.text == "\n \n"));
    }

    #[test]
    fn test_single_newline_is_not_a_paragraph() {
        let result = RegexParser.segment("Line one\nline two", &english());
        assert_eq!(result.paragraph_count(), 1);
        assert_eq!(result.sentence_count(), 1);
    }

    // ========================================================================
    // Substitution Tests
    // ========================================================================

    #[test]
    fn test_substitutions_apply_in_order() {
        let config = ParserConfig::builder()
            .substitutions("a=b|b=c")
            .build()
            .unwrap();
        let result = RegexParser.segment("a", &config);
        assert_eq!(result.text(), "c");
    }

    #[test]
    fn test_substitution_can_introduce_terminator() {
        let config = ParserConfig::builder()
            .substitutions("。=.")
            .build()
            .unwrap();
        let result = RegexParser.segment("One。Two", &config);
        assert_eq!(result.text(), "One.Two");
        // Glued ASCII terminator, still one sentence
        assert_eq!(result.sentence_count(), 1);
    }

    #[test]
    fn test_substitution_errors() {
        assert!(matches!(
            Substitutions::parse(&["abc"]),
            Err(ConfigError::InvalidSubstitution(rule)) if rule == "abc"
        ));
        assert!(matches!(
            Substitutions::parse(&["=x"]),
            Err(ConfigError::InvalidSubstitution(_))
        ));

        let rules = Substitutions::parse(&["a=", "x=y=z"]).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.apply("xa"), "y=z");
    }

    // ========================================================================
    // Config Validation Tests
    // ========================================================================

    #[test]
    fn test_empty_word_class_rejected() {
        assert_eq!(WordClass::new("").unwrap_err(), ConfigError::EmptyWordClass);
        assert_eq!(WordClass::new(" [] ").unwrap_err(), ConfigError::EmptyWordClass);
    }

    #[test]
    fn test_invalid_word_class_rejected() {
        let err = ParserConfig::builder()
            .word_characters("[a-")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWordClass { .. }));
    }

    #[test]
    fn test_zero_width_word_class_rejected() {
        let err = WordClass::new("[a-z]*|[0-9]").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWidthWordClass(_)));
    }

    #[test]
    fn test_word_class_bracketed_or_bare() {
        let bare = WordClass::new("a-z").unwrap();
        let bracketed = WordClass::new("[a-z]").unwrap();
        assert!(bare.contains('q') && bracketed.contains('q'));
        assert!(!bare.contains('Q') && !bracketed.contains('Q'));
    }

    #[test]
    fn test_terminators_ignore_backslashes() {
        let config = ParserConfig::builder()
            .split_sentences("\\.\\!")
            .build()
            .unwrap();
        assert!(config.is_terminator('.'));
        assert!(config.is_terminator('!'));
        assert!(!config.is_terminator('\\'));
        assert!(!config.is_terminator('?'));
    }

    #[test]
    fn test_exceptions_normalized() {
        let exceptions = SentenceExceptions::new(vec![
            " Dr. ".to_string(),
            "St.".to_string(),
            "Dr.".to_string(),
            String::new(),
            "e.g.".to_string(),
        ]);
        assert_eq!(exceptions.entries(), &["e.g.", "Dr.", "St."]);
    }

    #[test]
    fn test_language_settings_from_toml() {
        let config = ParserConfig::from_toml_str(
            r#"
            language_id = "en"
            regexp_split_sentences = ".!?"
            exceptions_split_sentences = "Mr.|Dr."
            character_substitutions = ["’='", "“=\""]
            "#,
        )
        .unwrap();

        assert_eq!(config.language_id(), Some("en"));
        assert_eq!(config.parser_type(), None);
        assert_eq!(config.exceptions().entries().len(), 2);
        assert_eq!(config.substitutions().len(), 2);

        let result = RegexParser.segment("It’s fine.", &config);
        assert_eq!(result.text(), "It's fine.");
    }

    #[test]
    fn test_language_settings_defaults_and_errors() {
        let config = ParserConfig::from_toml_str("parser_type = \"character\"").unwrap();
        assert_eq!(config.parser_type(), Some("character"));
        assert!(config.is_terminator('?'));
        assert!(config.is_word_char('é'));
        assert!(!config.is_word_char('×'));

        assert!(matches!(
            ParserConfig::from_toml_str("remove_spaces = \"yes\""),
            Err(ConfigError::Settings(_))
        ));
        assert!(matches!(
            ParserConfig::from_toml_str("regexp_word_characters = \"\""),
            Err(ConfigError::EmptyWordClass)
        ));
    }

    // ========================================================================
    // Result Metadata Tests
    // ========================================================================

    #[test]
    fn test_right_to_left_metadata() {
        let config = ParserConfig::builder()
            .language_id("ar")
            .right_to_left(true)
            .word_characters("\\x{0600}-\\x{06FF}")
            .build()
            .unwrap();
        let result = RegexParser.segment("مرحبا بالعالم", &config);

        assert!(result.is_right_to_left());
        assert_eq!(result.language_id(), Some("ar"));
        // Logical order is preserved
        assert_eq!(result.words().next().unwrap().text, "مرحبا");
    }

    #[test]
    fn test_invalid_utf8_becomes_replacement_character() {
        let result = RegexParser.segment_bytes(b"Hi \xFF there.", &english());
        assert_eq!(result.word_count(), 2);
        assert!(result.text().contains('\u{FFFD}'));
    }

    #[test]
    fn test_shared_config_across_threads() {
        let config = Arc::new(english());
        let text = "Mr. Jones is here. He left!\n\nA new paragraph, e.g. this one.";
        let expected = RegexParser.segment(text, &config);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let config = Arc::clone(&config);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| RegexParser.segment(text, &config))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for result in handle.join().unwrap() {
                assert_eq!(result, expected);
            }
        }
    }

    // ========================================================================
    // ParserRegistry Tests
    // ========================================================================

    #[test]
    fn test_builtin_registry() {
        let registry = ParserRegistry::builtin();
        assert_eq!(registry.parser_count(), 2);
        assert_eq!(registry.registered_ids(), vec!["regex", "character"]);
        assert!(registry.resolve("regex").is_some());
        assert!(registry.resolve("mecab").is_none());
    }

    #[test]
    fn test_unknown_parser_is_unavailable() {
        let registry = ParserRegistry::default();
        let err = registry.parse("mecab", "テスト", &english()).unwrap_err();

        assert!(matches!(err, ParserError::Unavailable { ref id, .. } if id == "mecab"));
        assert_eq!(err.parser_id(), "mecab");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_parse_configured_uses_language_parser() {
        let registry = ParserRegistry::builtin();

        let config = ParserConfig::builder().parser_type("character").build().unwrap();
        let result = registry.parse_configured("ab", &config).unwrap();
        assert_eq!(result.token_count(), 2);

        let result = registry.parse_configured("ab", &english()).unwrap();
        assert_eq!(result.token_count(), 1);
    }

    #[test]
    fn test_fallback_to_regex() {
        let registry = ParserRegistry::builtin();
        let result = registry
            .parse_or_fallback("mecab", "One. Two.", &english())
            .unwrap();
        assert_eq!(result.sentence_count(), 2);
    }

    #[test]
    fn test_list_available() {
        let registry = ParserRegistry::builtin();
        let infos = registry.list_available();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|i| i.available && i.message == "Available"));
        assert_eq!(infos[0].name, RegexParser.name());
    }

    #[test]
    fn test_registry_with_unavailable_external_parser() {
        let mut builder = AllowlistBuilder::new();
        builder
            .add(
                "mecab",
                ParserDefinition::new(
                    "MeCab",
                    "/nonexistent/bin/mecab",
                    InputMode::Stdin,
                    OutputFormat::Wakati,
                ),
            )
            .unwrap();
        let registry = ParserRegistry::with_allowlist(Arc::new(builder.build()));

        assert_eq!(registry.registered_ids(), vec!["regex", "character", "mecab"]);

        let info = registry
            .list_available()
            .into_iter()
            .find(|i| i.id == "mecab")
            .unwrap();
        assert_eq!(info.name, "MeCab");
        assert!(!info.available);
        assert!(info.message.contains("does not exist"));

        let err = registry.parse("mecab", "テスト", &english()).unwrap_err();
        assert!(matches!(err, ParserError::Unavailable { .. }));

        let result = registry
            .parse_or_fallback("mecab", "Still works.", &english())
            .unwrap();
        assert_eq!(result.word_count(), 2);
    }
}
