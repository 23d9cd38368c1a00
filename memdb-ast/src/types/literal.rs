use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::escape_single_quote_string;

/// SQL literal values: null, boolean, number and string.
///
/// Numbers keep their source spelling; whether they are integral or real is
/// decided at evaluation time.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// `NULL` value
    Null,
    /// Boolean literal, TRUE or FALSE
    Boolean(bool),
    /// Numeric literal
    Number(String),
    /// String literal (single quoted), e.g. 'string'
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(v) => f.write_str(if *v { "TRUE" } else { "FALSE" }),
            Self::Number(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "'{}'", escape_single_quote_string(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_display() {
        assert_eq!(Literal::Null.to_string(), "NULL");
        assert_eq!(Literal::Boolean(true).to_string(), "TRUE");
        assert_eq!(Literal::Number("12.5".into()).to_string(), "12.5");
        assert_eq!(Literal::String("it's".into()).to_string(), "'it''s'");
    }
}
