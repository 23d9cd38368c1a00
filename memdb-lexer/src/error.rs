use core::fmt;

/// The line/column position the lexer has scanned to, 1-based.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// Line number, starting at 1.
    pub line: u64,
    /// Column number, starting at 1.
    pub column: u64,
}

impl Default for Location {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Location {
    /// Advances the location over the given character.
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The kind of lexer failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LexerErrorKind {
    /// A single-quoted string literal was not terminated.
    MismatchedSingleQuotes,
    /// A double-quoted identifier was not terminated.
    MismatchedDoubleQuotes,
    /// A block comment was not terminated.
    UnterminatedComment,
}

/// Lexer error.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message} at {location}")]
pub struct LexerError {
    /// The kind of failure.
    pub kind: LexerErrorKind,
    /// A human-readable description.
    pub message: String,
    /// Where the failing token started.
    pub location: Location,
}

impl LexerError {
    pub(crate) fn new(kind: LexerErrorKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }
}
