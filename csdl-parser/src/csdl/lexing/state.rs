//! State carried from one line to the next.

use crate::csdl::token::TokenKind;
use serde::{Deserialize, Serialize};

/// Which scanner handles the next characters.
///
/// Strings and block comments may span lines; while one is open the next line starts in the
/// matching sub-tokenizer instead of the default one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tokenizer {
    #[default]
    Default,
    InString {
        quote: char,
    },
    InComment,
}

/// An open bracket, used for indentation hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFrame {
    /// Indentation of the line holding the opening bracket.
    pub parent_indent: usize,
    /// Visual column of the opening bracket.
    pub column: usize,
    /// Character that closes this frame.
    pub closing: char,
    /// Continuation lines align to the bracket column instead of indenting a unit.
    pub aligned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexerState {
    pub tokenizer: Tokenizer,
    /// Kind of the last non-whitespace token produced.
    pub last_kind: Option<TokenKind>,
    /// Open brackets, innermost last.
    pub context: Vec<ContextFrame>,
    /// The innermost frame was opened on the current line and nothing followed it yet.
    pub(crate) pending_align: bool,
}

impl LexerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a string or block comment is still open.
    pub fn is_continuing(&self) -> bool {
        self.tokenizer != Tokenizer::Default
    }

    pub fn depth(&self) -> usize {
        self.context.len()
    }

    pub(crate) fn push_context(&mut self, frame: ContextFrame) {
        self.context.push(frame);
        self.pending_align = true;
    }

    pub(crate) fn pop_context_if(&mut self, closing: char) -> bool {
        if self.context.last().map(|frame| frame.closing) == Some(closing) {
            self.context.pop();
            true
        } else {
            false
        }
    }
}
