use core::fmt;

use crate::keywords::Keyword;

/// SQL token
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Token {
    /// Whitespace (space, newline, tab).
    Whitespace(Whitespace),
    /// Single-line comment or multi-line comment.
    Comment(Comment),

    /// An unsigned numeric literal.
    Number(String),
    /// Character string literal, i.e. 'string', with escapes processed.
    String(String),

    /// A keyword (like SELECT) or an optionally quoted SQL identifier.
    /// Reserved words are permitted as identifiers if quoted.
    Word(Word),

    /// Period `.`
    Period,
    /// Comma `,`
    Comma,
    /// SemiColon `;`
    SemiColon,

    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,

    /// Equal `=`
    Equal,
    /// Not equal `<>` or `!=`
    NotEqual,
    /// Less than `<`
    Less,
    /// Less than or equal `<=`
    LessOrEqual,
    /// Greater than `>`
    Greater,
    /// Greater than or equal `>=`
    GreaterOrEqual,

    /// Plus `+`
    Plus,
    /// Minus `-`
    Minus,
    /// Asterisk `*`
    Asterisk,
    /// Slash `/`
    Slash,
    /// Percent `%`
    Percent,
    /// Concat `||`
    Concat,

    /// Question `?`, a positional parameter placeholder.
    Question,

    /// A character that could not be tokenized.
    Char(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Whitespace(space) => write!(f, "{}", space),
            Token::Comment(comment) => write!(f, "{}", comment),
            Token::Number(n) => f.write_str(n),
            Token::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Word(word) => write!(f, "{}", word),
            Token::Period => f.write_str("."),
            Token::Comma => f.write_str(","),
            Token::SemiColon => f.write_str(";"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Equal => f.write_str("="),
            Token::NotEqual => f.write_str("<>"),
            Token::Less => f.write_str("<"),
            Token::LessOrEqual => f.write_str("<="),
            Token::Greater => f.write_str(">"),
            Token::GreaterOrEqual => f.write_str(">="),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Asterisk => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Percent => f.write_str("%"),
            Token::Concat => f.write_str("||"),
            Token::Question => f.write_str("?"),
            Token::Char(c) => write!(f, "{}", c),
        }
    }
}

impl Token {
    /// Creates a SQL keyword or an optionally quoted SQL identifier.
    pub fn word(value: impl Into<String>, quote: Option<char>) -> Self {
        let value = value.into();
        Self::Word(Word {
            keyword: if quote.is_none() {
                Keyword::lookup(&value)
            } else {
                None
            },
            value,
            quote,
        })
    }

    /// Creates a SQL keyword token; returns `None` if the word is not a keyword.
    pub fn keyword(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        Keyword::lookup(&value).map(|kw| {
            Self::Word(Word {
                keyword: Some(kw),
                value,
                quote: None,
            })
        })
    }

    /// Checks if the token is whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    /// Checks if the token is a comment.
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    /// Checks if the token is the given keyword.
    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Token::Word(w) if w.keyword == Some(keyword))
    }

    /// Checks if the token is one of the given keywords.
    pub fn is_one_of_keywords(&self, keywords: &[Keyword]) -> Option<Keyword> {
        if let Token::Word(w) = self {
            if let Some(keyword) = w.keyword {
                if keywords.contains(&keyword) {
                    return Some(keyword);
                }
            }
        }
        None
    }
}

/// Whitespace token
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Whitespace {
    Space,
    Newline,
    Tab,
}

impl fmt::Display for Whitespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Space => f.write_str(" "),
            Self::Newline => f.write_str("\n"),
            Self::Tab => f.write_str("\t"),
        }
    }
}

/// Comment token
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Comment {
    /// Single line comment, `-- ...` to end of line.
    SingleLine {
        /// The comment text, without the `--` prefix.
        comment: String,
    },
    /// Multiple line comment, `/* ... */`.
    MultiLine(Vec<String>),
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SingleLine { comment } => write!(f, "--{}", comment),
            Self::MultiLine(lines) => {
                f.write_str("/*")?;
                let mut delim = "";
                for line in lines {
                    write!(f, "{}{}", delim, line)?;
                    delim = "\n";
                }
                f.write_str("*/")
            }
        }
    }
}

/// A keyword (like SELECT) or an optionally quoted SQL identifier
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Word {
    /// If the word was not quoted and it matched one of the known keywords,
    /// this holds the keyword, otherwise `None`.
    pub keyword: Option<Keyword>,
    /// The value of the token, without the enclosing quotes.
    pub value: String,
    /// An identifier can be "quoted" (a delimited identifier in ANSI
    /// parlance). Only double quotes are supported.
    pub quote: Option<char>,
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.quote {
            None => f.write_str(&self.value),
            Some(q) => write!(f, "{}{}{}", q, self.value, q),
        }
    }
}
