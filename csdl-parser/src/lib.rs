//! # csdl-parser
//!
//! Tokenizer and token navigation for CSDL, the content filtering language.
//!
//! File Layout
//!
//!     The crate is consumed by an editor shell that asks three kinds of questions: what is
//!     the token under the cursor, what token came before (or after) it, and what state does
//!     the next line start in. Everything here answers one of those.
//!
//!     src/csdl
//!       ├── token        Token and TokenKind
//!       ├── vocabulary   The configured word lists (targets, operators, ...)
//!       ├── lexing       Resumable, line-by-line tokenizer and indentation hints
//!       ├── buffer       Per-line token cache with incremental re-lexing
//!       ├── locator      Previous/next meaningful token lookup across lines
//!       └── testing      Factories shared by the tests of every csdl crate
//!
//! Nothing in this crate fails: unknown words are untyped tokens, unterminated strings and
//! comments simply carry their state to the next line.

pub mod csdl;
