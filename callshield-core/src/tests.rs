#[cfg(test)]
mod tests {
    use crate::config::ShieldConfig;
    use crate::matcher::*;

    fn toks(text: &str) -> Vec<String> {
        tokenize(text)
    }

    #[test]
    fn test_normalize_strips_punctuation_keeps_digits() {
        assert_eq!(normalize("Hello, World!!"), "hello world");
        assert_eq!(normalize("ref #482913."), "ref 482913");
        assert_eq!(normalize("  spaced\t\tout  "), "spaced out");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_tokenize_empty_and_punctuation_only() {
        assert!(toks("").is_empty());
        assert!(toks("   ...!!!  ").is_empty());
        assert_eq!(toks("one two"), vec!["one", "two"]);
    }

    #[test]
    fn test_levenshtein_within_bounds() {
        assert!(levenshtein_within("otp", "otp", 0));
        assert!(levenshtein_within("verification", "verifcation", 1));
        assert!(levenshtein_within("code", "coed", 2));
        assert!(!levenshtein_within("code", "coed", 1));
        assert!(!levenshtein_within("urgent", "relax", 2));
        // Length-difference pre-reject.
        assert!(!levenshtein_within("ab", "abcdef", 2));
        // A zero bound means exact matches only.
        assert!(!levenshtein_within("otp", "otb", 0));
    }

    #[test]
    fn test_levenshtein_early_exit_on_unrelated_words() {
        // Every row of the DP exceeds the bound immediately; the function
        // must still answer correctly.
        assert!(!levenshtein_within("aaaaaaaa", "zzzzzzzz", 1));
        assert!(levenshtein_within("aaaaaaaa", "aaaaaaza", 1));
    }

    #[test]
    fn test_fuzzy_token_match_short_words_exact_only() {
        let tokens = toks("please share the pin now");
        assert!(fuzzy_token_match(&tokens, "pin", 1));
        // "pn" is under the 3-char floor, so no fuzzy matching.
        assert!(!fuzzy_token_match(&tokens, "pn", 1));
        assert!(fuzzy_token_match(&tokens, "shre", 1));
        assert!(!fuzzy_token_match(&tokens, "", 1));
    }

    #[test]
    fn test_fuzzy_phrase_match_reorder_tolerant() {
        let tokens = toks("the code please share with me");
        assert!(fuzzy_phrase_match(&tokens, "share the code", 1, 2));
        // Typo in one phrase word still lands.
        let tokens = toks("kindly shere the code");
        assert!(fuzzy_phrase_match(&tokens, "share the code", 1, 2));
        // A missing content word does not.
        let tokens = toks("kindly share this");
        assert!(!fuzzy_phrase_match(&tokens, "share the code", 1, 2));
    }

    #[test]
    fn test_fuzzy_phrase_match_cheap_rejection() {
        let tokens = toks("hi");
        assert!(!fuzzy_phrase_match(&tokens, "one two three four five", 1, 2));
        assert!(!fuzzy_phrase_match(&tokens, "", 1, 2));
        // Single-word phrase delegates to token matching.
        assert!(fuzzy_phrase_match(&toks("this is urgent"), "urgent", 1, 2));
    }

    #[test]
    fn test_collapse_spelled_sequences() {
        assert_eq!(
            collapse_spelled_sequences("Please tell me the O T P"),
            "please tell me the otp"
        );
        assert_eq!(collapse_spelled_sequences("k y c update"), "kyc update");
        assert_eq!(collapse_spelled_sequences("nothing here"), "nothing here");
    }

    #[test]
    fn test_config_defaults() {
        let config = ShieldConfig::default();
        assert_eq!(config.scoring.max_transcript_tokens, 20_000);
        assert_eq!(config.scoring.max_alerts, 10_000);
        assert!(config.catalog.dataset_path.is_none());
    }

    #[test]
    fn test_config_missing_file_uses_defaults() {
        let config = ShieldConfig::load("/nonexistent/callshield.toml").unwrap();
        assert_eq!(config.scoring.max_transcript_tokens, 20_000);
    }

    #[test]
    fn test_config_parse_sections() {
        let config: ShieldConfig = toml::from_str(
            r#"
            [catalog]
            dataset_path = "phrases.json"

            [scoring]
            max_transcript_tokens = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.max_transcript_tokens, 500);
        assert_eq!(config.scoring.max_alerts, 10_000);
        assert_eq!(
            config.catalog.dataset_path.as_deref(),
            Some(std::path::Path::new("phrases.json"))
        );
    }

    #[test]
    fn test_config_rejects_bad_toml() {
        let path = std::env::temp_dir().join("callshield_bad_config.toml");
        std::fs::write(&path, "this is not { toml").unwrap();
        assert!(ShieldConfig::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
