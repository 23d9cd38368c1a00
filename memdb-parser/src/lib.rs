//! # memdb-parser
//!
//! memdb-parser turns a token stream into the typed statement trees of
//! [`memdb_ast`].

#![deny(missing_docs)]
#![deny(unused_imports)]

mod error;
mod parser;

pub use self::{
    error::ParserError,
    parser::Parser,
};
