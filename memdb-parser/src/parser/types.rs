use memdb_ast::{DataType, Ident, Literal, ObjectName};
use memdb_lexer::{Keyword, Token};

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Parses an identifier.
    pub fn parse_identifier(&mut self) -> Result<Ident, ParserError> {
        match self.next_token() {
            Some(Token::Word(w)) => Ok(Ident {
                value: w.value,
                quote: w.quote,
            }),
            unexpected => self.expected("identifier", unexpected),
        }
    }

    /// Parses a possibly qualified name, e.g. `alias.col`.
    pub fn parse_object_name(&mut self) -> Result<ObjectName, ParserError> {
        let mut idents = vec![];
        loop {
            idents.push(self.parse_identifier()?);
            if !self.next_token_if_is(&Token::Period) {
                break;
            }
        }
        Ok(ObjectName(idents))
    }

    /// Parses a literal.
    pub fn parse_literal(&mut self) -> Result<Literal, ParserError> {
        match self.next_token() {
            Some(Token::Word(w)) => match w.keyword {
                Some(Keyword::NULL) => Ok(Literal::Null),
                Some(Keyword::TRUE) => Ok(Literal::Boolean(true)),
                Some(Keyword::FALSE) => Ok(Literal::Boolean(false)),
                _ => self.expected("literal", Some(Token::Word(w))),
            },
            Some(Token::Number(n)) => Ok(Literal::Number(n)),
            Some(Token::String(s)) => Ok(Literal::String(s)),
            unexpected => self.expected("literal", unexpected),
        }
    }

    /// Parses a data type name.
    ///
    /// Any word is accepted; unknown names are untyped. An optional
    /// parenthesized precision like `VARCHAR(10)` is consumed and discarded.
    pub fn parse_data_type(&mut self) -> Result<DataType, ParserError> {
        match self.next_token() {
            Some(Token::Word(w)) => {
                let data_type = DataType::from_name(&w.value);
                if self.next_token_if_is(&Token::LeftParen) {
                    loop {
                        match self.next_token() {
                            Some(Token::RightParen) => break,
                            Some(Token::Number(_)) | Some(Token::Comma) => continue,
                            unexpected => return self.expected("precision", unexpected),
                        }
                    }
                }
                Ok(data_type)
            }
            unexpected => self.expected("data type", unexpected),
        }
    }

    /// Parses an optionally signed integer token.
    pub fn parse_signed_int(&mut self) -> Result<i64, ParserError> {
        let negative = self.next_token_if_is(&Token::Minus);
        match self.next_token() {
            Some(Token::Number(n)) => {
                let value = n.parse::<i64>().map_err(|e| {
                    ParserError::ExpectedIntValue(format!("could not parse '{}' as i64: {}", n, e))
                })?;
                Ok(if negative { -value } else { value })
            }
            unexpected => Err(ParserError::ExpectedIntValue(match unexpected {
                Some(found) => format!("Expected: integer, found: {}", found),
                None => "Expected: integer, but not found".into(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_identifier() -> Result<(), ParserError> {
        let ident = Parser::new_with_sql("foo")?.parse_identifier()?;
        assert_eq!(ident, Ident::new("foo"));
        let ident = Parser::new_with_sql("\"select\"")?.parse_identifier()?;
        assert_eq!(ident, Ident::quoted("select"));
        Ok(())
    }

    #[test]
    fn parse_object_name() -> Result<(), ParserError> {
        let name = Parser::new_with_sql("foo.bar")?.parse_object_name()?;
        assert_eq!(name, ObjectName(vec![Ident::new("foo"), Ident::new("bar")]));
        Ok(())
    }

    #[test]
    fn parse_literal() -> Result<(), ParserError> {
        assert_eq!(Parser::new_with_sql("NULL")?.parse_literal()?, Literal::Null);
        assert_eq!(
            Parser::new_with_sql("TRUE")?.parse_literal()?,
            Literal::Boolean(true)
        );
        assert_eq!(
            Parser::new_with_sql("12.5")?.parse_literal()?,
            Literal::Number("12.5".into())
        );
        assert_eq!(
            Parser::new_with_sql("'it''s'")?.parse_literal()?,
            Literal::String("it's".into())
        );
        Ok(())
    }

    #[test]
    fn parse_data_type() -> Result<(), ParserError> {
        assert_eq!(
            Parser::new_with_sql("INTEGER")?.parse_data_type()?,
            DataType::Integer
        );
        assert_eq!(
            Parser::new_with_sql("VARCHAR(10)")?.parse_data_type()?,
            DataType::Text
        );
        assert_eq!(
            Parser::new_with_sql("mystery")?.parse_data_type()?,
            DataType::None
        );
        Ok(())
    }

    #[test]
    fn parse_signed_int() -> Result<(), ParserError> {
        assert_eq!(Parser::new_with_sql("42")?.parse_signed_int()?, 42);
        assert_eq!(Parser::new_with_sql("-1")?.parse_signed_int()?, -1);
        assert!(matches!(
            Parser::new_with_sql("x")?.parse_signed_int(),
            Err(ParserError::ExpectedIntValue(_))
        ));
        Ok(())
    }
}
