//! Character cursor over a single line.
//!
//! The tokenizers consume a line one character at a time and need cheap lookahead, so the
//! line is decoded into chars once. Positions are character indices, the same unit token
//! columns use.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct LineStream<'a> {
    line: &'a str,
    chars: Vec<char>,
    /// Byte offset of every char, plus the line length as a final entry.
    offsets: Vec<usize>,
    pos: usize,
    start: usize,
}

impl<'a> LineStream<'a> {
    pub fn new(line: &'a str) -> Self {
        Self::at(line, 0)
    }

    /// Stream positioned at `column`, clipped to the line length.
    pub fn at(line: &'a str, column: usize) -> Self {
        let (mut offsets, chars): (Vec<usize>, Vec<char>) = line.char_indices().unzip();
        offsets.push(line.len());
        let pos = column.min(chars.len());
        Self {
            line,
            chars,
            offsets,
            pos,
            start: pos,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Begin a new token at the current position.
    pub fn mark_start(&mut self) {
        self.start = self.pos;
    }

    pub fn sol(&self) -> bool {
        self.pos == 0
    }

    pub fn eol(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume while `pred` holds. Returns whether anything was consumed.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let from = self.pos;
        while matches!(self.peek(), Some(ch) if pred(ch)) {
            self.pos += 1;
        }
        self.pos > from
    }

    pub fn eat_space(&mut self) -> bool {
        self.eat_while(char::is_whitespace)
    }

    pub fn skip_to_end(&mut self) {
        self.pos = self.chars.len();
    }

    /// Move to the next occurrence of `ch` without consuming it.
    pub fn skip_to(&mut self, ch: char) -> bool {
        match self.chars[self.pos..].iter().position(|&c| c == ch) {
            Some(offset) => {
                self.pos += offset;
                true
            }
            None => false,
        }
    }

    /// Consume a match of `pattern` that starts exactly at the current position.
    ///
    /// Patterns are expected to be anchored with `^`.
    pub fn eat_match(&mut self, pattern: &Regex) -> bool {
        let rest = &self.line[self.offsets[self.pos]..];
        match pattern.find(rest) {
            Some(found) if found.start() == 0 && !found.is_empty() => {
                self.pos += found.as_str().chars().count();
                true
            }
            _ => false,
        }
    }

    /// Text of the token being built, `start..pos`.
    pub fn current(&self) -> &'a str {
        &self.line[self.offsets[self.start]..self.offsets[self.pos]]
    }

    /// Width of the line's leading whitespace, tabs expanded to `tab_size`.
    pub fn indentation(&self, tab_size: usize) -> usize {
        let leading = self.chars.iter().take_while(|c| c.is_whitespace()).count();
        self.visual_column(leading, tab_size)
    }

    /// Visual column of character index `index`, tabs expanded to `tab_size`.
    pub fn visual_column(&self, index: usize, tab_size: usize) -> usize {
        let tab_size = tab_size.max(1);
        self.chars[..index.min(self.chars.len())]
            .iter()
            .fold(0, |column, &ch| {
                if ch == '\t' {
                    column + tab_size - column % tab_size
                } else {
                    column + 1
                }
            })
    }
}
