//! Property-based tests for the csdl lexer
//!
//! These tests ensure that the lexer accounts for every character of any line, that word
//! classification ignores case, and that incremental re-lexing agrees with lexing from
//! scratch.

use csdl_parser::csdl::testing::{sample_buffer, sample_lexer, sample_vocabulary};
use csdl_parser::csdl::{Token, TokenSource};
use proptest::prelude::*;

/// Generate lines made of csdl-looking fragments
fn csdl_line_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("fb.language".to_string()),
            Just("==".to_string()),
            Just("and".to_string()),
            Just("(".to_string()),
            Just(")".to_string()),
            Just("{".to_string()),
            Just("\"".to_string()),
            Just("'".to_string()),
            Just("/*".to_string()),
            Just("*/".to_string()),
            Just("//".to_string()),
            Just("[keep(default)]".to_string()),
            Just("\\".to_string()),
            "[0-9]{1,3}(\\.[0-9]{1,2})?",
            "[a-zA-Z_.]{1,8}",
            "[ \t]{1,3}",
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

fn reconstruct(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

proptest! {
    #[test]
    fn tokens_reproduce_the_line(line in csdl_line_strategy()) {
        let lexer = sample_lexer();
        let mut state = lexer.start_state();
        let tokens = lexer.tokenize_line(&line, &mut state);

        prop_assert_eq!(reconstruct(&tokens), line.clone());
        let mut column = 0;
        for token in &tokens {
            prop_assert_eq!(token.start, column);
            prop_assert!(token.end > token.start);
            prop_assert_eq!(token.text.chars().count(), token.end - token.start);
            column = token.end;
        }
        prop_assert_eq!(column, line.chars().count());
    }

    #[test]
    fn tokens_reproduce_lines_inside_open_strings(line in csdl_line_strategy()) {
        let lexer = sample_lexer();
        let mut state = lexer.start_state();
        lexer.tokenize_line("fb.language == \"open", &mut state);
        let tokens = lexer.tokenize_line(&line, &mut state);
        prop_assert_eq!(reconstruct(&tokens), line);
    }

    #[test]
    fn classification_ignores_case(word in "[a-zA-Z_.=!<>\\[\\]()]{1,16}") {
        let vocabulary = sample_vocabulary();
        prop_assert_eq!(vocabulary.classify(&word), vocabulary.classify(&word.to_lowercase()));
    }

    #[test]
    fn incremental_relex_matches_fresh_lex(
        lines in prop::collection::vec(csdl_line_strategy(), 1..6),
        replacement in csdl_line_strategy(),
        target in 0usize..6,
    ) {
        let text = lines.join("\n");
        let mut buffer = sample_buffer(&text);
        let target = target % buffer.line_count();
        buffer.set_line(target, &replacement);

        let fresh = sample_buffer(&buffer.text());
        for line in 0..fresh.line_count() {
            prop_assert_eq!(buffer.line_tokens(line), fresh.line_tokens(line));
        }
    }
}
