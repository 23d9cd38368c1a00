//! # memdb-ast
//!
//! memdb-ast holds the typed statement and expression trees built by the
//! memdb SQL parser. Every node implements `Display`, emitting canonical SQL
//! that parses back to an equal tree.

#![deny(missing_docs)]
#![deny(unused_imports)]

mod expression;
mod statement;
mod types;
mod utils;

pub use self::{expression::*, statement::*, types::*};
