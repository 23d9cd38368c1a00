use core::{iter::Peekable, str::Chars};

use crate::{
    error::{LexerError, LexerErrorKind, Location},
    tokens::{Comment, Token, Whitespace},
};

/// SQL Lexer
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    location: Location,
}

impl<'a> Lexer<'a> {
    /// Creates a new SQL lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            iter: input.chars().peekable(),
            location: Location::default(),
        }
    }

    /// Returns the current location scanned by the lexer.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Tokenizes the input and produces a sequence of tokens.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = vec![];
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        match self.iter.peek() {
            Some(&ch) => match ch {
                ' ' | '\t' | '\n' | '\r' => Ok(self.tokenize_whitespace().map(Token::Whitespace)),
                '\'' => {
                    let start = self.location;
                    self.next_char(); // consume the open quote
                    let s = self.tokenize_string_literal(start)?;
                    Ok(Some(Token::String(s)))
                }
                '"' => {
                    let start = self.location;
                    self.next_char(); // consume the open quote
                    let ident = self.tokenize_delimited_ident(start)?;
                    Ok(Some(Token::word(ident, Some('"'))))
                }
                ch if is_identifier_start(ch) => {
                    self.next_char();
                    let ident = self.tokenize_ident(ch);
                    Ok(Some(Token::word(ident, None)))
                }
                ch if ch.is_ascii_digit() || ch == '.' => self.tokenize_number(),
                _ => self.tokenize_symbol(),
            },
            None => Ok(None),
        }
    }

    fn tokenize_whitespace(&mut self) -> Option<Whitespace> {
        self.iter.next().map(|ch| match ch {
            ' ' => {
                self.location.column += 1;
                Whitespace::Space
            }
            '\t' => {
                self.location.column += 1;
                Whitespace::Tab
            }
            '\n' => {
                self.location.line += 1;
                self.location.column = 1;
                Whitespace::Newline
            }
            '\r' => {
                // Emit a single Whitespace::Newline token for \r and \r\n
                self.iter.next_if_eq(&'\n');
                self.location.line += 1;
                self.location.column = 1;
                Whitespace::Newline
            }
            _ => unreachable!(),
        })
    }

    /// Consumes a single-quoted string literal, the open quote already
    /// consumed. A doubled quote is an escaped quote.
    fn tokenize_string_literal(&mut self, start: Location) -> Result<String, LexerError> {
        let mut s = String::new();
        loop {
            match self.next_char() {
                Some('\'') => {
                    if self.next_if_is('\'') {
                        s.push('\'');
                    } else {
                        return Ok(s);
                    }
                }
                Some(ch) => s.push(ch),
                None => {
                    return Err(LexerError::new(
                        LexerErrorKind::MismatchedSingleQuotes,
                        "Unterminated string literal",
                        start,
                    ));
                }
            }
        }
    }

    fn tokenize_delimited_ident(&mut self, start: Location) -> Result<String, LexerError> {
        let s = self.next_while(|&ch| ch != '"');
        // consume the close quote.
        if self.next_if_is('"') {
            Ok(s)
        } else {
            Err(LexerError::new(
                LexerErrorKind::MismatchedDoubleQuotes,
                "Expected close delimiter '\"' before EOF",
                start,
            ))
        }
    }

    fn tokenize_ident(&mut self, first: char) -> String {
        let mut ident = first.to_string();
        let rest = next_while(&mut self.location, &mut self.iter, |ch| {
            is_identifier_part(*ch)
        });
        ident.push_str(&rest);
        ident
    }

    fn tokenize_number(&mut self) -> Result<Option<Token>, LexerError> {
        let mut s = self.next_while(|ch| ch.is_ascii_digit());

        // match one period
        if self.next_if_is('.') {
            s.push('.');
        }
        s += &self.next_while(|ch| ch.is_ascii_digit());

        // No digits -> Token::Period
        if s == "." {
            return Ok(Some(Token::Period));
        }
        Ok(Some(Token::Number(s)))
    }

    fn tokenize_symbol(&mut self) -> Result<Option<Token>, LexerError> {
        let start = self.location;
        let token = self.next_if_token(|ch| {
            Some(match ch {
                ',' => Token::Comma,
                ';' => Token::SemiColon,
                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '=' => Token::Equal,
                '<' => Token::Less,
                '>' => Token::Greater,
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Asterisk,
                '/' => Token::Slash,
                '%' => Token::Percent,
                '!' => Token::Char('!'),
                '|' => Token::Char('|'),
                '?' => Token::Question,
                _ => Token::Char(ch),
            })
        });
        if let Some(token) = token {
            // multi-character operators are recognized greedily
            Ok(Some(match token {
                Token::Less if self.next_if_is('>') => Token::NotEqual,
                Token::Less if self.next_if_is('=') => Token::LessOrEqual,
                Token::Greater if self.next_if_is('=') => Token::GreaterOrEqual,
                Token::Char('!') if self.next_if_is('=') => Token::NotEqual,
                Token::Char('|') if self.next_if_is('|') => Token::Concat,
                Token::Minus if self.next_if_is('-') => {
                    Token::Comment(self.tokenize_single_line_comment())
                }
                Token::Slash if self.next_if_is('*') => {
                    Token::Comment(self.tokenize_multi_line_comment(start)?)
                }
                token => token,
            }))
        } else {
            Ok(None)
        }
    }

    /// Tokenizes a single-line comment and returns the comment.
    fn tokenize_single_line_comment(&mut self) -> Comment {
        let comment = self.next_while(|c| c != &'\n');
        // the newline itself stays in the stream as whitespace
        Comment::SingleLine { comment }
    }

    /// Tokenizes a multi-line comment and returns the comment.
    fn tokenize_multi_line_comment(&mut self, start: Location) -> Result<Comment, LexerError> {
        let mut comment = String::new();
        let mut nested = 1u32;
        loop {
            match self.next_char() {
                Some(ch) => {
                    if ch == '*' && self.next_if_is('/') {
                        if nested == 1 {
                            let lines = comment.split('\n').map(|s| s.to_string()).collect();
                            break Ok(Comment::MultiLine(lines));
                        } else {
                            nested -= 1;
                            comment.push_str("*/");
                        }
                    } else if ch == '/' && self.next_if_is('*') {
                        nested += 1;
                        comment.push_str("/*");
                    } else {
                        comment.push(ch);
                    }
                }
                None => {
                    return Err(LexerError::new(
                        LexerErrorKind::UnterminatedComment,
                        "Unexpected EOF while in a multi-line comment",
                        start,
                    ));
                }
            }
        }
    }

    /// Grabs the next single-character token if the tokenizer function returns one
    fn next_if_token<F: Fn(char) -> Option<Token>>(&mut self, tokenizer: F) -> Option<Token> {
        let token = self.iter.peek().and_then(|&c| tokenizer(c))?;
        self.next_char();
        Some(token)
    }

    /// Consumes the next character and records the current location.
    fn next_char(&mut self) -> Option<char> {
        if let Some(ch) = self.iter.next() {
            self.location.advance(ch);
            Some(ch)
        } else {
            None
        }
    }

    /// Consumes the next character if it matches `ch` and returns true on a match.
    #[inline]
    fn next_if_is(&mut self, ch: char) -> bool {
        if self.iter.next_if_eq(&ch).is_some() {
            self.location.advance(ch);
            true
        } else {
            false
        }
    }

    /// Grabs the next characters that match the predicate, as a string
    fn next_while<F: Fn(&char) -> bool>(&mut self, predicate: F) -> String {
        next_while(&mut self.location, &mut self.iter, predicate)
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn next_while<F: Fn(&char) -> bool>(
    loc: &mut Location,
    chars: &mut Peekable<Chars<'_>>,
    predicate: F,
) -> String {
    let mut value = String::new();
    while let Some(ch) = chars.next_if(&predicate) {
        loc.advance(ch);
        value.push(ch);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! tokenize {
        ($input:expr, $expected:expr) => {{
            let mut lexer = Lexer::new($input);
            let got = lexer.tokenize();
            assert_eq!(got, $expected);
        }};
    }

    #[test]
    fn tokenize_whitespace() {
        tokenize!(
            " a\nb\t\rc",
            Ok(vec![
                Token::Whitespace(Whitespace::Space),
                Token::word("a", None),
                Token::Whitespace(Whitespace::Newline),
                Token::word("b", None),
                Token::Whitespace(Whitespace::Tab),
                Token::Whitespace(Whitespace::Newline),
                Token::word("c", None),
            ])
        );
    }

    #[test]
    fn tokenize_single_line_comment() {
        tokenize!(
            "0--note\n1",
            Ok(vec![
                Token::Number("0".into()),
                Token::Comment(Comment::SingleLine {
                    comment: "note".into()
                }),
                Token::Whitespace(Whitespace::Newline),
                Token::Number("1".into()),
            ])
        );

        // comment at eof
        tokenize!(
            "0-- note",
            Ok(vec![
                Token::Number("0".into()),
                Token::Comment(Comment::SingleLine {
                    comment: " note".into()
                }),
            ])
        );
    }

    #[test]
    fn tokenize_multi_line_comment() {
        tokenize!(
            "/*line1\nline2*/",
            Ok(vec![Token::Comment(Comment::MultiLine(vec![
                "line1".into(),
                "line2".into(),
            ]))])
        );
        tokenize!(
            "/*a/*b*/c*/",
            Ok(vec![Token::Comment(Comment::MultiLine(vec![
                "a/*b*/c".into()
            ]))])
        );
        tokenize!(
            "/*open",
            Err(LexerError::new(
                LexerErrorKind::UnterminatedComment,
                "Unexpected EOF while in a multi-line comment",
                Location { line: 1, column: 1 },
            ))
        );
    }

    #[test]
    fn tokenize_number_literal() {
        tokenize!(
            ".1 12345.6789 0. .",
            Ok(vec![
                Token::Number(".1".into()),
                Token::Whitespace(Whitespace::Space),
                Token::Number("12345.6789".into()),
                Token::Whitespace(Whitespace::Space),
                Token::Number("0.".into()),
                Token::Whitespace(Whitespace::Space),
                Token::Period,
            ])
        );
    }

    #[test]
    fn tokenize_string_literal() {
        tokenize!("'hello'", Ok(vec![Token::String("hello".into())]));
        // doubled quote is an escaped quote
        tokenize!("'it''s'", Ok(vec![Token::String("it's".into())]));
        // the empty literal is an ordinary empty string token
        tokenize!("''", Ok(vec![Token::String("".into())]));
        // newline inside a string literal
        tokenize!("'a\nb'", Ok(vec![Token::String("a\nb".into())]));

        tokenize!(
            "select 'foo",
            Err(LexerError::new(
                LexerErrorKind::MismatchedSingleQuotes,
                "Unterminated string literal",
                Location { line: 1, column: 8 },
            ))
        );
    }

    #[test]
    fn tokenize_delimited_ident() {
        tokenize!("\"foo\"", Ok(vec![Token::word("foo", Some('"'))]));

        tokenize!(
            "\"foo",
            Err(LexerError::new(
                LexerErrorKind::MismatchedDoubleQuotes,
                "Expected close delimiter '\"' before EOF",
                Location { line: 1, column: 1 },
            ))
        );
    }

    #[test]
    fn tokenize_operators() {
        tokenize!(
            "a<=b<>c!=d>=e||f",
            Ok(vec![
                Token::word("a", None),
                Token::LessOrEqual,
                Token::word("b", None),
                Token::NotEqual,
                Token::word("c", None),
                Token::NotEqual,
                Token::word("d", None),
                Token::GreaterOrEqual,
                Token::word("e", None),
                Token::Concat,
                Token::word("f", None),
            ])
        );
    }

    #[test]
    fn tokenize_placeholder() {
        tokenize!(
            "id=?",
            Ok(vec![
                Token::word("id", None),
                Token::Equal,
                Token::Question,
            ])
        );
    }

    #[test]
    fn tokenize_simple_select() {
        tokenize!(
            "SELECT * FROM customer WHERE id = 1",
            Ok(vec![
                Token::keyword("SELECT").unwrap(),
                Token::Whitespace(Whitespace::Space),
                Token::Asterisk,
                Token::Whitespace(Whitespace::Space),
                Token::keyword("FROM").unwrap(),
                Token::Whitespace(Whitespace::Space),
                Token::word("customer", None),
                Token::Whitespace(Whitespace::Space),
                Token::keyword("WHERE").unwrap(),
                Token::Whitespace(Whitespace::Space),
                Token::word("id", None),
                Token::Whitespace(Whitespace::Space),
                Token::Equal,
                Token::Whitespace(Whitespace::Space),
                Token::Number("1".into()),
            ])
        );
    }
}
