#[cfg(test)]
mod tests {
    use crate::{
        Allowlist, AllowlistBuilder, AllowlistError, BinaryResolver, InputMode, OutputFormat,
        ParserDefinition,
    };
    use crate::allowlist::DEFAULT_TIMEOUT_MS;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const MECAB_TOML: &str = r#"
[parsers.mecab]
name = "MeCab"
binary = "/nonexistent/bin/mecab"
args = ["-Owakati"]
input_mode = "stdin"
output_format = "wakati"
languages = ["ja"]

[parsers.jieba]
name = "Jieba"
binary = "/nonexistent/bin/jieba"
input_mode = "file"
output_format = "line"
timeout_ms = 2500
blank_line_breaks = true
"#;

    fn wakati(binary: &str) -> ParserDefinition {
        ParserDefinition::new("Test", binary, InputMode::Stdin, OutputFormat::Wakati)
    }

    #[test]
    fn test_builder_empty() {
        let allowlist = AllowlistBuilder::new().build();
        assert!(allowlist.is_empty());
        assert_eq!(allowlist.len(), 0);
        assert!(Allowlist::empty().get("mecab").is_none());
    }

    #[test]
    fn test_load_toml() {
        let allowlist = AllowlistBuilder::new()
            .load_toml_str(MECAB_TOML)
            .unwrap()
            .build();

        assert_eq!(allowlist.len(), 2);
        assert!(allowlist.contains("mecab"));
        assert!(allowlist.contains("jieba"));

        let mecab = allowlist.get("mecab").unwrap();
        assert_eq!(mecab.definition.name, "MeCab");
        assert_eq!(mecab.definition.args, vec!["-Owakati"]);
        assert_eq!(mecab.definition.input_mode, InputMode::Stdin);
        assert_eq!(mecab.definition.output_format, OutputFormat::Wakati);
        assert_eq!(mecab.definition.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(mecab.definition.languages, vec!["ja"]);
        assert!(!mecab.definition.blank_line_breaks);

        let jieba = allowlist.get("jieba").unwrap();
        assert_eq!(jieba.definition.input_mode, InputMode::File);
        assert_eq!(jieba.definition.timeout(), Duration::from_millis(2500));
        assert!(jieba.definition.blank_line_breaks);
        assert!(jieba.definition.args.is_empty());
    }

    #[test]
    fn test_missing_binary_kept_but_unresolved() {
        let allowlist = AllowlistBuilder::new()
            .load_toml_str(MECAB_TOML)
            .unwrap()
            .build();

        let mecab = allowlist.get("mecab").unwrap();
        assert!(mecab.resolved_binary().is_none());
        assert!(mecab.resolution.as_ref().unwrap_err().contains("does not exist"));
    }

    #[test]
    fn test_strict_rejects_missing_binary() {
        let err = AllowlistBuilder::new()
            .require_binaries(true)
            .load_toml_str(MECAB_TOML)
            .err()
            .unwrap();
        assert!(matches!(err, AllowlistError::BinaryUnavailable { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let raw = r#"
[parsers.mecab]
name = "MeCab"
binary = "/usr/bin/mecab"
input_mode = "stdin"
output_format = "wakati"
shell = true
"#;
        let err = AllowlistBuilder::new().load_toml_str(raw).err().unwrap();
        assert!(matches!(err, AllowlistError::Parse(_)));
    }

    #[test]
    fn test_bad_mode_rejected() {
        let raw = r#"
[parsers.mecab]
name = "MeCab"
binary = "/usr/bin/mecab"
input_mode = "socket"
output_format = "wakati"
"#;
        assert!(matches!(
            AllowlistBuilder::new().load_toml_str(raw).err().unwrap(),
            AllowlistError::Parse(_)
        ));

        assert!(matches!(
            AllowlistBuilder::new().load_toml_str("[parsers.mecab]\nname = \"x\"").err().unwrap(),
            AllowlistError::Parse(_)
        ));
    }

    #[test]
    fn test_invalid_identifier() {
        let mut builder = AllowlistBuilder::new();
        for id in ["", "MeCab", "-mecab", "me cab", "../mecab"] {
            let err = builder.add(id, wakati("/bin/true")).unwrap_err();
            assert!(matches!(err, AllowlistError::InvalidId(_)), "accepted {:?}", id);
        }
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_reserved_identifiers() {
        let mut builder = AllowlistBuilder::new();
        for id in ["regex", "character"] {
            let err = builder.add(id, wakati("/bin/true")).unwrap_err();
            assert!(err.to_string().contains("reserved"));
        }
    }

    #[test]
    fn test_duplicate_identifier() {
        let mut builder = AllowlistBuilder::new();
        builder.add("mecab", wakati("/nonexistent/mecab")).unwrap();
        let err = builder.add("mecab", wakati("/nonexistent/mecab")).unwrap_err();
        assert!(matches!(err, AllowlistError::Duplicate { ref id } if id == "mecab"));
    }

    #[test]
    fn test_invalid_definitions() {
        let mut builder = AllowlistBuilder::new();

        let mut unnamed = wakati("/nonexistent/a");
        unnamed.name = "  ".to_string();
        assert!(matches!(
            builder.add("a", unnamed).unwrap_err(),
            AllowlistError::InvalidDefinition { .. }
        ));

        assert!(matches!(
            builder.add("b", wakati("/nonexistent/b").timeout_ms(0)).unwrap_err(),
            AllowlistError::InvalidDefinition { .. }
        ));

        assert!(matches!(
            builder
                .add("c", wakati("/nonexistent/c").args(["ok", "bad\0arg"]))
                .unwrap_err(),
            AllowlistError::InvalidDefinition { .. }
        ));
    }

    #[test]
    fn test_ids_in_load_order() {
        let mut builder = AllowlistBuilder::new();
        builder.add("zeta", wakati("/nonexistent/z")).unwrap();
        builder.add("alpha", wakati("/nonexistent/a")).unwrap();
        let allowlist = builder.build();

        assert_eq!(allowlist.ids().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(allowlist.entries()[1].id, "alpha");
    }

    #[test]
    fn test_relative_binary_unresolved() {
        let mut builder = AllowlistBuilder::new();
        builder.add("rel", wakati("bin/mecab")).unwrap();
        let allowlist = builder.build();

        let reason = allowlist.get("rel").unwrap().resolution.clone().unwrap_err();
        assert!(reason.contains("Relative path"));
    }

    #[test]
    fn test_bare_name_uses_resolver() {
        let mut builder = AllowlistBuilder::new().resolver(BinaryResolver::with_search_path(vec![]));
        builder.add("cat", wakati("cat")).unwrap();
        let allowlist = builder.build();

        let reason = allowlist.get("cat").unwrap().resolution.clone().unwrap_err();
        assert!(reason.contains("not found on search path"));
    }

    #[cfg(unix)]
    #[test]
    fn test_bare_name_resolved_on_search_path() {
        let resolver = BinaryResolver::with_search_path(vec!["/usr/bin".into(), "/bin".into()]);
        let mut builder = AllowlistBuilder::new()
            .resolver(resolver)
            .require_binaries(true);
        builder.add("cat", wakati("cat")).unwrap();
        let allowlist = builder.build();

        let path = allowlist.get("cat").unwrap().resolved_binary().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("cat"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MECAB_TOML.as_bytes()).unwrap();
        file.flush().unwrap();

        let allowlist = Allowlist::load(file.path()).unwrap();
        assert_eq!(allowlist.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Allowlist::load("/nonexistent/allowlist.toml").unwrap_err();
        assert!(matches!(err, AllowlistError::Read { .. }));
    }

    #[test]
    fn test_empty_document() {
        let allowlist = AllowlistBuilder::new().load_toml_str("").unwrap().build();
        assert!(allowlist.is_empty());
    }
}
