//! Property-based tests for completion prediction
//!
//! Whatever the cursor context, a candidate is never exactly as long as the typed prefix,
//! always extends it case-insensitively, and the result is sorted without duplicates.

use csdl_analysis::compute_completions;
use csdl_parser::csdl::testing::{mk_token, sample_vocabulary};
use csdl_parser::csdl::{Token, TokenKind};
use proptest::prelude::*;

fn previous_strategy() -> impl Strategy<Value = Option<Token>> {
    prop_oneof![
        Just(None),
        Just(Some(mk_token(Some(TokenKind::Target), "fb.link", 0))),
        Just(Some(mk_token(Some(TokenKind::Operator), "cs", 0))),
        Just(Some(mk_token(Some(TokenKind::Operator), "contains_near", 0))),
        Just(Some(mk_token(Some(TokenKind::Logical), "and", 0))),
        Just(Some(mk_token(Some(TokenKind::String), "\"x\"", 0))),
        Just(Some(mk_token(Some(TokenKind::OpenBracket), "(", 0))),
        Just(Some(mk_token(Some(TokenKind::CloseBracket), ")", 0))),
        Just(Some(mk_token(Some(TokenKind::Keyword), "tag", 0))),
    ]
}

proptest! {
    #[test]
    fn candidates_strictly_extend_the_prefix(
        prefix in "[a-zA-Z_.\\[(=<>!]{0,6}",
        previous in previous_strategy(),
    ) {
        let vocabulary = sample_vocabulary();
        let token = mk_token(None, &prefix, 20);
        let completions = compute_completions(&token, previous.as_ref(), &vocabulary);

        let lowered = prefix.to_lowercase();
        for candidate in &completions {
            prop_assert_ne!(candidate.chars().count(), prefix.chars().count());
            prop_assert!(candidate.to_lowercase().starts_with(&lowered));
        }
        for pair in completions.windows(2) {
            prop_assert!(pair[0].to_lowercase() <= pair[1].to_lowercase());
            prop_assert_ne!(&pair[0], &pair[1]);
        }
    }
}
