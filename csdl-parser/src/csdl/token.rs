//! Core token types shared by the lexer, the buffer and the analysis tooling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical category of a token.
///
/// Whitespace and words that are not part of the configured vocabulary have no kind at all,
/// which is why [`Token::kind`] is an `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    OpenBracket,
    CloseBracket,
    String,
    Comment,
    Number,
    Operator,
    Logical,
    Keyword,
    Punctuation,
    Target,
}

impl TokenKind {
    /// Style name used by editor themes for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::OpenBracket => "openbracket",
            TokenKind::CloseBracket => "closebracket",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::Logical => "logical",
            TokenKind::Keyword => "keyword",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Target => "target",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified span of a single line.
///
/// Columns count characters, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: Option<TokenKind>,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: Option<TokenKind>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }

    /// Zero-width untyped token, what the host reports at the very start of a line.
    pub fn empty(column: usize) -> Self {
        Self::new(None, "", column, column)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == Some(kind)
    }

    /// True for tokens that carry grammar meaning: typed and not a comment.
    pub fn is_meaningful(&self) -> bool {
        matches!(self.kind, Some(kind) if kind != TokenKind::Comment)
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind.is_none() && self.text.chars().all(char::is_whitespace)
    }

    /// Number of characters in the token text.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{}({:?})", kind, self.text),
            None => write!(f, "null({:?})", self.text),
        }
    }
}

/// Read access to tokenized lines, the contract the editor host fulfils.
///
/// [`TokenizedBuffer`](crate::csdl::TokenizedBuffer) is the in-crate implementation; hosts
/// that keep their own line cache implement the first three methods and get
/// [`token_at`](TokenSource::token_at) for free.
pub trait TokenSource {
    fn line_count(&self) -> usize;

    fn line_text(&self, line: usize) -> Option<&str>;

    /// Tokens of a line, covering it without gaps. Empty for out of range lines.
    fn line_tokens(&self, line: usize) -> &[Token];

    /// Token under a cursor placed *before* `column`.
    ///
    /// Column 0 yields an empty untyped token. Otherwise the token with
    /// `start < column <= end` is returned, with `column` clipped to the line length.
    fn token_at(&self, line: usize, column: usize) -> Option<Token> {
        let text = self.line_text(line)?;
        let column = column.min(text.chars().count());
        if column == 0 {
            return Some(Token::empty(0));
        }
        let tokens = self.line_tokens(line);
        let index = tokens.partition_point(|token| token.end < column);
        tokens.get(index).cloned()
    }
}
