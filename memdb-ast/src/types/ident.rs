use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An identifier, decomposed into its value and the quote style.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ident {
    /// The value of the identifier without quotes.
    pub value: String,
    /// An identifier can be "quoted" (a delimited identifier in ANSI
    /// parlance). Only double quotes are supported.
    pub quote: Option<char>,
}

impl Ident {
    /// Create a new identifier with the given value and no quotes.
    pub fn new<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Ident {
            value: value.into(),
            quote: None,
        }
    }

    /// Create a new double-quoted identifier with the given value.
    pub fn quoted<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Ident {
            value: value.into(),
            quote: Some('"'),
        }
    }
}

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Ident::new(value)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.quote {
            None => f.write_str(&self.value),
            Some(q) => write!(f, "{}{}{}", q, self.value, q),
        }
    }
}
