//! Previous/next token locator
//!
//!     Completion, smart fields and folding all need the nearest token that means something
//!     grammatically: typed, and not a comment. The search walks away from a position one
//!     token at a time, wrapping across line boundaries (blank lines are crossed immediately)
//!     and gives up at the start or end of the buffer.
//!
//!     The walk moves by whole tokens. Every column inside a token resolves to that same
//!     token, so this visits the same tokens a character-by-character walk would, in the same
//!     order.

use crate::csdl::token::{Token, TokenSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// Nearest meaningful token before or after `column` on `line`.
///
/// Backward considers tokens ending at or before `column`; forward considers tokens
/// starting at or after it. `None` when the buffer edge is reached first.
pub fn find_adjacent_token<S>(
    source: &S,
    direction: Direction,
    line: usize,
    column: usize,
) -> Option<Token>
where
    S: TokenSource + ?Sized,
{
    if line >= source.line_count() {
        return None;
    }
    let found = match direction {
        Direction::Backward => walk_backward(source, line, column),
        Direction::Forward => walk_forward(source, line, column),
    };
    tracing::trace!(
        ?direction,
        line,
        column,
        found = ?found.as_ref().map(|t| &t.text),
        "locate token"
    );
    found
}

/// Nearest meaningful token before `column`. Pass a token's `start` to find its predecessor.
pub fn find_previous_token<S>(source: &S, line: usize, column: usize) -> Option<Token>
where
    S: TokenSource + ?Sized,
{
    find_adjacent_token(source, Direction::Backward, line, column)
}

/// Nearest meaningful token after `column`. Pass a token's `end` to find its successor.
pub fn find_next_token<S>(source: &S, line: usize, column: usize) -> Option<Token>
where
    S: TokenSource + ?Sized,
{
    find_adjacent_token(source, Direction::Forward, line, column)
}

/// Like [`find_previous_token`], also reporting the line the token was found on.
pub fn find_previous_token_with_line<S>(
    source: &S,
    line: usize,
    column: usize,
) -> Option<(usize, Token)>
where
    S: TokenSource + ?Sized,
{
    if line >= source.line_count() {
        return None;
    }
    walk_backward_with_line(source, line, column)
}

fn walk_backward<S>(source: &S, line: usize, column: usize) -> Option<Token>
where
    S: TokenSource + ?Sized,
{
    walk_backward_with_line(source, line, column).map(|(_, token)| token)
}

fn walk_backward_with_line<S>(source: &S, mut line: usize, column: usize) -> Option<(usize, Token)>
where
    S: TokenSource + ?Sized,
{
    let mut column = column.min(line_len(source, line));
    loop {
        if column == 0 {
            if line == 0 {
                return None;
            }
            line -= 1;
            column = line_len(source, line);
            continue;
        }
        let token = source.token_at(line, column)?;
        if token.is_meaningful() {
            return Some((line, token));
        }
        column = token.start.min(column - 1);
    }
}

fn walk_forward<S>(source: &S, mut line: usize, column: usize) -> Option<Token>
where
    S: TokenSource + ?Sized,
{
    let mut column = column;
    loop {
        let len = line_len(source, line);
        if column >= len {
            if line + 1 >= source.line_count() {
                return None;
            }
            line += 1;
            column = 0;
            continue;
        }
        // The token covering the character at `column`.
        let token = source.token_at(line, column + 1)?;
        if token.is_meaningful() {
            return Some(token);
        }
        column = token.end.max(column + 1);
    }
}

fn line_len<S>(source: &S, line: usize) -> usize
where
    S: TokenSource + ?Sized,
{
    source
        .line_text(line)
        .map(|text| text.chars().count())
        .unwrap_or(0)
}
