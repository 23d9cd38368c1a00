use memdb_parser::ParserError;

/// Execution error.
///
/// Together with [`ParserError`] (absorbed here via the `Parse` variant)
/// this is the complete error surface of the engine. Every variant carries a
/// human-readable message.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The SQL could not be tokenized or parsed.
    #[error(transparent)]
    Parse(#[from] ParserError),

    /// The statement parses but the engine does not execute it.
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),
    /// The statement is not allowed in this context.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    /// `CREATE TABLE` for a name that already exists.
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
    /// A statement referenced a table that does not exist.
    #[error("unknown table: {0}")]
    UnknownTable(String),
    /// A record or statement referenced a column that does not exist.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// A uniqueness constraint was violated.
    #[error("duplicate record: {0}")]
    DuplicateRecord(String),
    /// A record does not fit the table schema.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// A CHECK constraint evaluated to false.
    #[error("failed check constraint: {0}")]
    FailedCheckConstraint(String),
    /// An expression was applied to values it cannot work on.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// A query produced no result set.
    #[error("no rows returned: {0}")]
    NoRowsReturned(String),
    /// The number of `?` placeholders does not match the parameter list.
    #[error("uneven number of parameters: {0}")]
    UnevenNumberOfParameters(String),
}

/// The engine result type.
pub type Result<T> = core::result::Result<T, Error>;
