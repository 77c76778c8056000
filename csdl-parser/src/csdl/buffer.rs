//! Tokenized buffer
//!
//!     Keeps the lines of a document together with the lexer state at every line boundary
//!     and the tokens of every line, so token lookups are a binary search instead of a
//!     re-lex. Edits re-lex from the first changed line and stop as soon as the state flowing
//!     out of a line matches what was cached for the next one: typing inside a line costs
//!     one line, opening a string or comment costs the lines it swallows.

use crate::csdl::lexing::{Lexer, LexerState};
use crate::csdl::token::{Token, TokenSource};
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct TokenizedBuffer {
    lexer: Lexer,
    lines: Vec<String>,
    /// State at the start of each line, plus the state at the end of the buffer.
    states: Vec<LexerState>,
    tokens: Vec<Vec<Token>>,
}

impl TokenizedBuffer {
    pub fn new(lexer: Lexer, text: &str) -> Self {
        let mut buffer = Self {
            lexer,
            lines: Vec::new(),
            states: Vec::new(),
            tokens: Vec::new(),
        };
        buffer.set_text(text);
        buffer
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the whole document.
    pub fn set_text(&mut self, text: &str) {
        self.lines = split_lines(text);
        self.states = vec![self.lexer.start_state(); self.lines.len() + 1];
        self.tokens = vec![Vec::new(); self.lines.len()];
        self.relex(0, self.lines.len());
    }

    pub fn set_line(&mut self, line: usize, text: &str) -> Range<usize> {
        self.replace_lines(line..line + 1, [text.to_string()])
    }

    /// Replace the lines in `range` with `new_lines` and re-lex what changed.
    ///
    /// Returns the range of lines whose tokens were recomputed.
    pub fn replace_lines<I>(&mut self, range: Range<usize>, new_lines: I) -> Range<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let end = range.end.min(self.lines.len());
        let start = range.start.min(end);
        let new_lines: Vec<String> = new_lines.into_iter().collect();
        let inserted = new_lines.len();

        self.lines.splice(start..end, new_lines);
        self.tokens
            .splice(start..end, std::iter::repeat_with(Vec::new).take(inserted));

        // `states[start]` is still valid. `states[end]` is the cached start of the first
        // unchanged line and must stay in place for the convergence check.
        if inserted == 0 {
            self.states.drain(start + 1..end + 1);
        } else {
            let cached = self.states[end].clone();
            self.states.splice(
                start + 1..end + 1,
                std::iter::repeat_with(LexerState::default)
                    .take(inserted - 1)
                    .chain(std::iter::once(cached)),
            );
        }

        if self.lines.is_empty() {
            self.lines.push(String::new());
            self.tokens.push(Vec::new());
            self.states.push(self.lexer.start_state());
        }

        self.relex(start, start + inserted)
    }

    /// State at the start of `line`.
    pub fn state_before(&self, line: usize) -> Option<&LexerState> {
        if line < self.lines.len() {
            self.states.get(line)
        } else {
            None
        }
    }

    /// State at the end of `line`.
    pub fn state_after(&self, line: usize) -> Option<&LexerState> {
        if line < self.lines.len() {
            self.states.get(line + 1)
        } else {
            None
        }
    }

    /// Indentation hint for `line`, based on the brackets open at its start.
    pub fn indent_for(&self, line: usize) -> Option<usize> {
        let state = self.state_before(line)?;
        let text_after = self.lines[line].trim_start();
        self.lexer.indent(state, text_after)
    }

    /// Re-lex from `first`, at least up to `until`, then until states converge.
    fn relex(&mut self, first: usize, until: usize) -> Range<usize> {
        let mut line = first;
        while line < self.lines.len() {
            let mut state = self.states[line].clone();
            self.tokens[line] = self.lexer.tokenize_line(&self.lines[line], &mut state);
            state.pending_align = false;

            let converged = line + 1 >= until && self.states[line + 1] == state;
            self.states[line + 1] = state;
            line += 1;
            if converged {
                break;
            }
        }
        tracing::debug!(from = first, to = line, "re-lexed lines");
        first..line
    }
}

impl TokenSource for TokenizedBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_text(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    fn line_tokens(&self, line: usize) -> &[Token] {
        self.tokens.get(line).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
