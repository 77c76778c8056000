//! The three scanners: default, quoted string and block comment.
//!
//! Each consumes exactly one token from the stream and returns its kind. Switching between
//! them happens through [`Tokenizer`] in the state, never through stored closures.

use super::state::{LexerState, Tokenizer};
use super::stream::LineStream;
use crate::csdl::token::TokenKind;
use crate::csdl::vocabulary::{is_namespaced_tag, GrammarVocabulary};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rest of a numeric literal once its first digit has been consumed.
static NUMBER_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?").expect("number pattern is valid")
});

/// Rest of a float written without a leading zero, after the `.`.
static DOT_NUMBER_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9eE]+").expect("dot number pattern is valid"));

const PUNCTUATION_CONTROL_START: &str = "[keep";

pub(crate) fn scan(
    stream: &mut LineStream<'_>,
    state: &mut LexerState,
    vocabulary: &GrammarVocabulary,
) -> Option<TokenKind> {
    match state.tokenizer {
        Tokenizer::Default => scan_default(stream, state, vocabulary),
        Tokenizer::InString { quote } => Some(scan_string(stream, state, quote)),
        Tokenizer::InComment => Some(scan_comment(stream, state)),
    }
}

fn scan_default(
    stream: &mut LineStream<'_>,
    state: &mut LexerState,
    vocabulary: &GrammarVocabulary,
) -> Option<TokenKind> {
    let ch = stream.next()?;

    match ch {
        '(' | '{' => return Some(TokenKind::OpenBracket),
        ')' | '}' => return Some(TokenKind::CloseBracket),
        '"' | '\'' => {
            tracing::trace!(quote = %ch, "entering string");
            state.tokenizer = Tokenizer::InString { quote: ch };
            return Some(scan_string(stream, state, ch));
        }
        '/' if stream.eat('/') => {
            stream.skip_to_end();
            return Some(TokenKind::Comment);
        }
        '/' if stream.eat('*') => {
            tracing::trace!("entering block comment");
            state.tokenizer = Tokenizer::InComment;
            return Some(scan_comment(stream, state));
        }
        c if c.is_ascii_digit() && !stream.peek().is_some_and(is_word_char) => {
            stream.eat_match(&NUMBER_TAIL);
            return Some(TokenKind::Number);
        }
        '.' if stream.eat_match(&DOT_NUMBER_TAIL) => return Some(TokenKind::Number),
        _ => {}
    }

    // A word runs until whitespace or a bracket.
    stream.eat_while(|c| !c.is_whitespace() && !is_bracket(c));
    let word = stream.current().to_lowercase();
    if let Some(kind) = classify_before_punctuation(vocabulary, &word) {
        return Some(kind);
    }

    // `[keep(default)]` contains brackets, so the word stopped at `(`. Take the rest.
    let word = if word == PUNCTUATION_CONTROL_START {
        stream.eat_while(|c| !c.is_whitespace());
        stream.current().to_lowercase()
    } else {
        word
    };

    if vocabulary.is_punctuation_control(&word) {
        Some(TokenKind::Punctuation)
    } else if vocabulary.is_target(&word) {
        Some(TokenKind::Target)
    } else {
        None
    }
}

fn classify_before_punctuation(vocabulary: &GrammarVocabulary, word: &str) -> Option<TokenKind> {
    if vocabulary.is_operator(word) {
        Some(TokenKind::Operator)
    } else if vocabulary.is_logical(word) {
        Some(TokenKind::Logical)
    } else if vocabulary.is_keyword(word) || is_namespaced_tag(word) {
        Some(TokenKind::Keyword)
    } else {
        None
    }
}

/// Consume up to and including the closing `quote`, or to the end of the line.
///
/// A backslash escapes the character after it, which only matters for the quote.
fn scan_string(stream: &mut LineStream<'_>, state: &mut LexerState, quote: char) -> TokenKind {
    let mut escaped = false;
    while let Some(ch) = stream.next() {
        if ch == quote && !escaped {
            tracing::trace!("string closed");
            state.tokenizer = Tokenizer::Default;
            break;
        }
        escaped = !escaped && ch == '\\';
    }
    TokenKind::String
}

/// Consume up to and including `*/`, or to the end of the line.
fn scan_comment(stream: &mut LineStream<'_>, state: &mut LexerState) -> TokenKind {
    loop {
        if !stream.skip_to('*') {
            stream.skip_to_end();
            break;
        }
        stream.next();
        if stream.eat('/') {
            tracing::trace!("block comment closed");
            state.tokenizer = Tokenizer::Default;
            break;
        }
    }
    TokenKind::Comment
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_bracket(ch: char) -> bool {
    matches!(ch, '(' | ')' | '{' | '}')
}
