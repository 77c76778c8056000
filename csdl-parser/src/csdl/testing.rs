//! Testing utilities
//!
//!     Factories for tokens and a fixed sample vocabulary, shared by the tests of every csdl
//!     crate so that fixtures do not drift apart. The sample vocabulary mirrors the shipped
//!     defaults closely enough for realistic filters, plus the geo operators.

use crate::csdl::buffer::TokenizedBuffer;
use crate::csdl::lexing::{Lexer, LexerOptions};
use crate::csdl::token::{Token, TokenKind};
use crate::csdl::vocabulary::{GrammarVocabulary, VocabularySpec};
use std::sync::Arc;

const TARGETS: &[&str] = &[
    "fb.author.age",
    "fb.author.country",
    "fb.author.gender",
    "fb.language",
    "fb.link",
    "fb.parent.language",
    "fb.sentiment",
    "fb.topics.name",
    "interaction.hashtags",
    "interaction.tags",
    "links.domain",
    "links.url",
];

const OPERATORS: &[&str] = &[
    "cs",
    "contains",
    "contains_any",
    "any",
    "substr",
    "contains_near",
    "near",
    "exists",
    "in",
    "url_in",
    "==",
    "!=",
    ">",
    ">=",
    "<",
    "<=",
    "regex_partial",
    "regex_exact",
    "contains_phrase",
    "all",
    "contains_all",
    "geo_box",
    "geo_radius",
    "geo_polygon",
];

pub fn sample_spec() -> VocabularySpec {
    let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
    VocabularySpec {
        targets: owned(TARGETS),
        operators: owned(OPERATORS),
        logical: owned(&["and", "or"]),
        unary: owned(&["not"]),
        keywords: owned(&["stream", "tag", "tags", "return"]),
        punctuation_control: owned(&["[keep(default)]", "[keep(classic)]", "[keep(extended)]"]),
    }
}

pub fn sample_vocabulary() -> GrammarVocabulary {
    GrammarVocabulary::from_spec(&sample_spec())
}

pub fn sample_lexer() -> Lexer {
    Lexer::new(Arc::new(sample_vocabulary()), LexerOptions::default())
}

/// Tokenized buffer over `text` using the sample vocabulary.
pub fn sample_buffer(text: &str) -> TokenizedBuffer {
    TokenizedBuffer::new(sample_lexer(), text)
}

pub fn mk_token(kind: Option<TokenKind>, text: &str, start: usize) -> Token {
    Token::new(kind, text, start, start + text.chars().count())
}

/// Build a contiguous token list from `(kind, text)` pairs, computing columns.
pub fn mk_tokens(parts: &[(Option<TokenKind>, &str)]) -> Vec<Token> {
    let mut column = 0;
    parts
        .iter()
        .map(|(kind, text)| {
            let token = mk_token(*kind, text, column);
            column = token.end;
            token
        })
        .collect()
}

/// Compact rendering of a token list, one `kind(text)` per token, whitespace skipped.
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|token| !token.is_whitespace())
        .map(|token| token.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
