//! # memdb
//!
//! memdb is a portable, embedded, in-memory SQL engine: a hand-written
//! lexer and parser build a typed statement tree, and an execution engine
//! runs a useful subset of the SQLite dialect against tables held in RAM.
//!
//! ```
//! use memdb::{Database, Value};
//!
//! let mut db = Database::new();
//! db.execute(
//!     "CREATE TABLE parts (part_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)",
//!     &[],
//! )?;
//! db.execute("INSERT INTO parts (name) VALUES (?)", &[Value::Text("bolt".into())])?;
//! let rows = db.query("SELECT part_id, name FROM parts", &[])?;
//! assert_eq!(rows[0]["part_id"], Value::Integer(1));
//! # Ok::<(), memdb::Error>(())
//! ```

#![deny(missing_docs)]
#![deny(unused_imports)]

mod bind;
mod error;
mod eval;
mod record;
mod schema;
mod store;
mod table;
mod value;

pub use self::{
    bind::bind_parameters,
    error::{Error, Result},
    eval::{contains_aggregate, AggregatePass, EvalContext},
    record::{Record, RecordSet},
    schema::{ColumnSchema, TableSchema},
    store::Database,
    table::TableStore,
    value::Value,
};

pub use memdb_ast as ast;
pub use memdb_lexer as lexer;
pub use memdb_parser as parser;
