//! Main module for csdl library functionality

pub mod buffer;
pub mod lexing;
pub mod locator;
pub mod testing;
pub mod token;
pub mod vocabulary;

pub use buffer::TokenizedBuffer;
pub use lexing::{ContextFrame, Lexer, LexerOptions, LexerState, LineTokens, Tokenizer};
pub use locator::{
    find_adjacent_token, find_next_token, find_previous_token, find_previous_token_with_line,
    Direction,
};
pub use token::{Token, TokenKind, TokenSource};
pub use vocabulary::{GrammarVocabulary, VocabularySpec, WordCategory};
