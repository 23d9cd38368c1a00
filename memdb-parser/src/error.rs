use memdb_lexer::{LexerError, LexerErrorKind};

/// Parser error.
///
/// Every variant carries a human-readable message describing what was found
/// instead of what was expected.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParserError {
    /// The statement starts with a word that is not a keyword.
    #[error("unknown keyword: {0}")]
    UnknownKeyword(String),
    /// A keyword appeared where it cannot start or continue a statement.
    #[error("invalid keyword: {0}")]
    InvalidKeyword(String),
    /// A call syntax named a function the dialect does not have.
    #[error("unknown function name: {0}")]
    UnknownFunctionName(String),
    /// A single-quoted string literal was not terminated.
    #[error("mismatched single quotes: {0}")]
    MismatchedSingleQuotes(String),
    /// A double-quoted identifier was not terminated.
    #[error("mismatched double quotes: {0}")]
    MismatchedDoubleQuotes(String),
    /// Unbalanced parentheses.
    #[error("mismatched parenthesis: {0}")]
    MismatchedParenthesis(String),
    /// Anything else the grammar cannot make sense of.
    #[error("malformed SQL command: {0}")]
    MalformedSqlCommand(String),
    /// A clause that requires an integer got something else.
    #[error("expected integer value: {0}")]
    ExpectedIntValue(String),
}

impl From<LexerError> for ParserError {
    fn from(err: LexerError) -> Self {
        match err.kind {
            LexerErrorKind::MismatchedSingleQuotes => {
                ParserError::MismatchedSingleQuotes(err.to_string())
            }
            LexerErrorKind::MismatchedDoubleQuotes => {
                ParserError::MismatchedDoubleQuotes(err.to_string())
            }
            LexerErrorKind::UnterminatedComment => {
                ParserError::MalformedSqlCommand(err.to_string())
            }
        }
    }
}
