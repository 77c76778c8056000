//! Lexer
//!
//!     CSDL is tokenized one line at a time, the way editor widgets highlight: the host keeps
//!     a [`LexerState`] per line boundary and feeds each line together with the state the
//!     previous line ended in. A call to [`Lexer::tokenize`] produces exactly one token and
//!     the state after it; [`Lexer::tokens`] wraps that into a lazy iterator over a line.
//!
//! Rules
//!
//!     Applied to the next unconsumed character, first match wins:
//!         1. Whitespace runs become untyped tokens (the state is left untouched).
//!         2. `(` `{` open and `)` `}` close a bracket.
//!         3. `"` or `'` starts a string, which may continue on following lines.
//!         4. `//` comments out the rest of the line, `/*` opens a block comment that may
//!            continue on following lines until `*/`.
//!         5. A digit not followed by a word character starts a number; so does a `.`
//!            followed by digits or an exponent marker.
//!         6. Anything else is a word running to the next whitespace or bracket, classified
//!            through the [`GrammarVocabulary`]. Unknown words are untyped.
//!
//!     The tokens of a line cover it without gaps, so joining their text gives the line back.
//!
//! Bracket Context
//!
//!     Both bracket pairs push a [`ContextFrame`] when opened and pop it when the matching
//!     closer shows up; [`Lexer::indent`] turns the innermost frame into an indentation hint.
//!     Comments never touch the context.

pub mod state;
pub mod stream;
mod tokenizers;

pub use state::{ContextFrame, LexerState, Tokenizer};
pub use stream::LineStream;

use crate::csdl::token::{Token, TokenKind};
use crate::csdl::vocabulary::GrammarVocabulary;
use serde::Deserialize;
use std::sync::Arc;

/// Layout knobs for indentation hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LexerOptions {
    pub indent_unit: usize,
    pub tab_size: usize,
    /// Let a bracket followed by a token on the same line align continuation lines to it.
    pub align_brackets: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            indent_unit: 2,
            tab_size: 4,
            align_brackets: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lexer {
    vocabulary: Arc<GrammarVocabulary>,
    options: LexerOptions,
}

impl Lexer {
    pub fn new(vocabulary: Arc<GrammarVocabulary>, options: LexerOptions) -> Self {
        Self {
            vocabulary,
            options,
        }
    }

    pub fn vocabulary(&self) -> &GrammarVocabulary {
        &self.vocabulary
    }

    pub fn shared_vocabulary(&self) -> Arc<GrammarVocabulary> {
        Arc::clone(&self.vocabulary)
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    pub fn start_state(&self) -> LexerState {
        LexerState::new()
    }

    /// Produce the token starting at `column` of `line`, and the state after it.
    ///
    /// Returns `None` once the line is exhausted. Call again with the returned state and
    /// the token's `end` to continue.
    pub fn tokenize(
        &self,
        line: &str,
        column: usize,
        state: &LexerState,
    ) -> Option<(Token, LexerState)> {
        let mut stream = LineStream::at(line, column);
        let mut state = state.clone();
        let token = self.next_token(&mut stream, &mut state)?;
        Some((token, state))
    }

    /// Lazily tokenize a whole line starting from `state`.
    pub fn tokens<'a>(&'a self, line: &'a str, mut state: LexerState) -> LineTokens<'a> {
        state.pending_align = false;
        LineTokens {
            lexer: self,
            stream: LineStream::new(line),
            state,
        }
    }

    /// Tokenize a whole line, advancing `state` to the start of the next line.
    pub fn tokenize_line(&self, line: &str, state: &mut LexerState) -> Vec<Token> {
        let mut tokens = self.tokens(line, std::mem::take(state));
        let collected: Vec<Token> = tokens.by_ref().collect();
        *state = tokens.into_state();
        collected
    }

    /// Indentation hint for a line starting with `text_after`, given the state at its start.
    ///
    /// `None` when no bracket is open: the host keeps whatever indentation it has.
    pub fn indent(&self, state: &LexerState, text_after: &str) -> Option<usize> {
        let frame = state.context.last()?;
        if frame.aligned {
            let closes = text_after.starts_with(frame.closing);
            Some(frame.column + usize::from(!closes))
        } else {
            Some(frame.parent_indent + self.options.indent_unit)
        }
    }

    fn next_token(&self, stream: &mut LineStream<'_>, state: &mut LexerState) -> Option<Token> {
        if stream.eol() {
            return None;
        }
        if stream.sol() {
            state.pending_align = false;
        }
        stream.mark_start();

        if stream.eat_space() {
            return Some(self.emit(stream, None));
        }

        let kind = tokenizers::scan(stream, state, &self.vocabulary);
        state.last_kind = kind;
        if kind != Some(TokenKind::Comment) {
            self.track_context(stream, state, kind);
        }
        Some(self.emit(stream, kind))
    }

    fn track_context(
        &self,
        stream: &LineStream<'_>,
        state: &mut LexerState,
        kind: Option<TokenKind>,
    ) {
        let closing = match (kind, stream.current()) {
            (Some(TokenKind::OpenBracket), "(") => Some(')'),
            (Some(TokenKind::OpenBracket), "{") => Some('}'),
            _ => None,
        };

        if let Some(closing) = closing {
            let frame = ContextFrame {
                parent_indent: stream.indentation(self.options.tab_size),
                column: stream.visual_column(stream.start(), self.options.tab_size),
                closing,
                aligned: false,
            };
            tracing::trace!(closing = %closing, depth = state.context.len() + 1, "push context");
            state.push_context(frame);
            return;
        }

        if state.pending_align {
            state.pending_align = false;
            if self.options.align_brackets {
                if let Some(frame) = state.context.last_mut() {
                    frame.aligned = true;
                }
            }
        }

        if kind != Some(TokenKind::CloseBracket) {
            return;
        }
        if let Some(ch) = stream.current().chars().next() {
            if state.pop_context_if(ch) {
                tracing::trace!(closing = %ch, depth = state.context.len(), "pop context");
            }
        }
    }

    fn emit(&self, stream: &LineStream<'_>, kind: Option<TokenKind>) -> Token {
        Token::new(kind, stream.current(), stream.start(), stream.pos())
    }
}

/// Iterator over the tokens of one line. See [`Lexer::tokens`].
#[derive(Debug)]
pub struct LineTokens<'a> {
    lexer: &'a Lexer,
    stream: LineStream<'a>,
    state: LexerState,
}

impl LineTokens<'_> {
    /// State after the tokens produced so far.
    pub fn state(&self) -> &LexerState {
        &self.state
    }

    pub fn into_state(self) -> LexerState {
        self.state
    }
}

impl Iterator for LineTokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.lexer.next_token(&mut self.stream, &mut self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csdl::testing::{mk_tokens, render_tokens, sample_lexer};
    use rstest::rstest;

    fn lex_line(line: &str) -> Vec<Token> {
        let lexer = sample_lexer();
        let mut state = lexer.start_state();
        lexer.tokenize_line(line, &mut state)
    }

    #[test]
    fn test_simple_condition() {
        let tokens = lex_line(r#"fb.language == "en""#);
        assert_eq!(
            tokens,
            mk_tokens(&[
                (Some(TokenKind::Target), "fb.language"),
                (None, " "),
                (Some(TokenKind::Operator), "=="),
                (None, " "),
                (Some(TokenKind::String), "\"en\""),
            ])
        );
    }

    #[test]
    fn test_brackets_and_logicals() {
        let tokens = lex_line(r#"(fb.author.age > 25 OR links.domain cs "x") and not tag.a"#);
        insta::assert_snapshot!(
            render_tokens(&tokens),
            @r#"openbracket("(") target("fb.author.age") operator(">") null("25") logical("OR") target("links.domain") operator("cs") string("\"x\"") closebracket(")") logical("and") logical("not") keyword("tag.a")"#
        );
    }

    #[rstest]
    #[case("5", Some(TokenKind::Number), "5")]
    #[case("5)", Some(TokenKind::Number), "5")]
    #[case("5.25", Some(TokenKind::Number), "5.25")]
    #[case("7e10", None, "7e10")]
    #[case(".5", Some(TokenKind::Number), ".5")]
    #[case(".e3", Some(TokenKind::Number), ".e3")]
    #[case(".x", None, ".x")]
    #[case("12", None, "12")]
    fn test_number_rules(
        #[case] line: &str,
        #[case] kind: Option<TokenKind>,
        #[case] text: &str,
    ) {
        let tokens = lex_line(line);
        assert_eq!(tokens[0].kind, kind);
        assert_eq!(tokens[0].text, text);
    }

    #[test]
    fn test_punctuation_control_spans_its_brackets() {
        let tokens = lex_line("interaction.hashtags contains [keep(classic)] \"x\"");
        assert_eq!(tokens[4].kind, Some(TokenKind::Punctuation));
        assert_eq!(tokens[4].text, "[keep(classic)]");
    }

    #[test]
    fn test_unknown_keep_variant_is_untyped_and_leaves_context_alone() {
        let lexer = sample_lexer();
        let mut state = lexer.start_state();
        let tokens = lexer.tokenize_line("[keep(weird)]", &mut state);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, None);
        assert!(state.context.is_empty());
    }

    #[test]
    fn test_line_comment_consumes_rest() {
        let tokens = lex_line("fb.link exists // check ( brackets");
        let last = tokens.last().expect("tokens");
        assert_eq!(last.kind, Some(TokenKind::Comment));
        assert_eq!(last.text, "// check ( brackets");
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        let tokens = lex_line(r#""say \"hi\"" and"#);
        assert_eq!(tokens[0].text, r#""say \"hi\"""#);
        assert_eq!(tokens[0].kind, Some(TokenKind::String));
        assert_eq!(tokens[2].kind, Some(TokenKind::Logical));
    }

    #[test]
    fn test_unterminated_block_comment_carries_over() {
        let lexer = sample_lexer();
        let mut state = lexer.start_state();
        let tokens = lexer.tokenize_line("/* start of comment", &mut state);
        assert_eq!(
            tokens,
            mk_tokens(&[(Some(TokenKind::Comment), "/* start of comment")])
        );
        assert_eq!(state.tokenizer, Tokenizer::InComment);

        let tokens = lexer.tokenize_line("still */ fb.link", &mut state);
        assert_eq!(tokens[0].kind, Some(TokenKind::Comment));
        assert_eq!(tokens[0].text, "still */");
        assert_eq!(tokens[2].kind, Some(TokenKind::Target));
        assert_eq!(state.tokenizer, Tokenizer::Default);
    }

    #[test]
    fn test_multiline_string() {
        let lexer = sample_lexer();
        let mut state = lexer.start_state();
        let first = lexer.tokenize_line("links.url in 'a,", &mut state);
        assert_eq!(first.last().map(|t| t.text.as_str()), Some("'a,"));
        assert_eq!(state.tokenizer, Tokenizer::InString { quote: '\'' });

        let second = lexer.tokenize_line("b' or", &mut state);
        assert_eq!(second[0].kind, Some(TokenKind::String));
        assert_eq!(second[0].text, "b'");
        assert_eq!(second[2].kind, Some(TokenKind::Logical));
    }

    #[test]
    fn test_tokenize_single_steps() {
        let lexer = sample_lexer();
        let state = lexer.start_state();
        let (token, state) = lexer.tokenize("fb.link exists", 0, &state).expect("token");
        assert_eq!(token.kind, Some(TokenKind::Target));
        assert_eq!(state.last_kind, Some(TokenKind::Target));
        let (space, state) = lexer.tokenize("fb.link exists", token.end, &state).expect("space");
        assert_eq!(space.kind, None);
        let (op, state) = lexer.tokenize("fb.link exists", space.end, &state).expect("op");
        assert_eq!(op.text, "exists");
        assert!(lexer.tokenize("fb.link exists", op.end, &state).is_none());
    }

    #[test]
    fn test_context_push_and_pop() {
        let lexer = sample_lexer();
        let mut state = lexer.start_state();
        lexer.tokenize_line("  (fb.link exists {", &mut state);
        assert_eq!(state.depth(), 2);
        assert_eq!(state.context[0].closing, ')');
        assert_eq!(state.context[0].parent_indent, 2);
        assert_eq!(state.context[0].column, 2);
        lexer.tokenize_line("}", &mut state);
        assert_eq!(state.depth(), 1);
        lexer.tokenize_line("}", &mut state);
        assert_eq!(state.depth(), 1, "mismatched closer leaves the frame alone");
        lexer.tokenize_line(")", &mut state);
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_indent_hints() {
        let lexer = sample_lexer();
        let mut state = lexer.start_state();
        assert_eq!(lexer.indent(&state, "fb.link"), None);
        lexer.tokenize_line("    (", &mut state);
        assert_eq!(lexer.indent(&state, "fb.link"), Some(6));
    }

    #[test]
    fn test_aligned_indent_hints() {
        let options = LexerOptions {
            align_brackets: true,
            ..LexerOptions::default()
        };
        let lexer = Lexer::new(sample_lexer().shared_vocabulary(), options);
        let mut state = lexer.start_state();
        lexer.tokenize_line("stream (fb.link exists", &mut state);
        assert!(state.context[0].aligned);
        assert_eq!(lexer.indent(&state, "and fb.language"), Some(8));
        assert_eq!(lexer.indent(&state, ")"), Some(7));

        let mut state = lexer.start_state();
        lexer.tokenize_line("stream (", &mut state);
        assert!(!state.context[0].aligned);
        assert_eq!(lexer.indent(&state, "fb.link"), Some(2));
    }

    #[test]
    fn test_empty_line_has_no_tokens() {
        assert!(lex_line("").is_empty());
    }
}
