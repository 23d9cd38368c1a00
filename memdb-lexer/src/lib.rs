//! # memdb-lexer
//!
//! memdb-lexer converts SQL text into a sequence of tokens for the memdb
//! in-memory SQL engine.

#![deny(missing_docs)]
#![deny(unused_imports)]

mod error;
mod keywords;
mod lexer;
mod tokens;

pub use self::{
    error::{LexerError, LexerErrorKind, Location},
    keywords::{Keyword, ALL_KEYWORDS, ALL_KEYWORD_STRINGS},
    lexer::Lexer,
    tokens::{Comment, Token, Whitespace, Word},
};
