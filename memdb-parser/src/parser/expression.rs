use memdb_ast::{
    BetweenExpr, BinaryOpExpr, BinaryOperator, CaseExpr, CastExpr, CollateExpr, Expr, Function,
    FunctionKind, Ident, InListExpr, IsNullExpr, ObjectName, TextMatchExpr, TextMatchOp,
    UnaryOpExpr, UnaryOperator,
};
use memdb_lexer::{Keyword, Token, Word};

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Parses a new expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_subexpr(0)
    }

    /// Parses tokens until the precedence changes.
    pub(crate) fn parse_subexpr(&mut self, precedence: u8) -> Result<Expr, ParserError> {
        let mut expr = self.parse_prefix()?;
        loop {
            let next_precedence = self.next_precedence();
            if precedence >= next_precedence {
                break;
            }
            expr = self.parse_infix(Box::new(expr), next_precedence)?;
        }
        Ok(expr)
    }

    const UNARY_NOT_PREC: u8 = 15;
    const LIKE_PREC: u8 = 17;
    const CMP_PREC: u8 = 20;
    const PLUS_MINUS_PREC: u8 = 30;
    const MUL_PREC: u8 = 40;

    /// Parses an expression prefix.
    fn parse_prefix(&mut self) -> Result<Expr, ParserError> {
        match self.peek_token().cloned() {
            Some(Token::Number(_)) | Some(Token::String(_)) => {
                Ok(Expr::Literal(self.parse_literal()?))
            }
            Some(Token::Word(word)) => match word.keyword {
                Some(Keyword::NULL) | Some(Keyword::TRUE) | Some(Keyword::FALSE) => {
                    Ok(Expr::Literal(self.parse_literal()?))
                }
                Some(Keyword::CASE) => self.parse_case_expr(),
                Some(Keyword::CAST) => self.parse_cast_expr(),
                Some(Keyword::NOT) => {
                    self.next_token(); // consume the `NOT` keyword
                    Ok(Expr::UnaryOp(UnaryOpExpr {
                        op: UnaryOperator::Not,
                        expr: Box::new(self.parse_subexpr(Self::UNARY_NOT_PREC)?),
                    }))
                }
                _ if self.peek_nth_token(1) == Some(&Token::LeftParen) => {
                    self.parse_function_expr(word)
                }
                _ if self.peek_nth_token(1) == Some(&Token::Period) => {
                    self.next_token(); // consume the leading word
                    let mut id_parts = vec![Ident {
                        value: word.value,
                        quote: word.quote,
                    }];
                    let mut ends_with_wildcard = false;
                    while self.next_token_if_is(&Token::Period) {
                        match self.next_token() {
                            Some(Token::Word(w)) => id_parts.push(Ident {
                                value: w.value,
                                quote: w.quote,
                            }),
                            Some(Token::Asterisk) => {
                                ends_with_wildcard = true;
                                break;
                            }
                            unexpected => {
                                return self.expected("an identifier or a '*' after '.'", unexpected)
                            }
                        }
                    }
                    if ends_with_wildcard {
                        Ok(Expr::QualifiedWildcard(ObjectName(id_parts)))
                    } else {
                        Ok(Expr::CompoundIdentifier(id_parts))
                    }
                }
                _ => Ok(Expr::Identifier(self.parse_identifier()?)),
            },
            Some(Token::Minus) => {
                self.next_token(); // consume `-`
                Ok(Expr::UnaryOp(UnaryOpExpr {
                    op: UnaryOperator::Minus,
                    expr: Box::new(self.parse_subexpr(Self::PLUS_MINUS_PREC)?),
                }))
            }
            Some(Token::Plus) => {
                self.next_token(); // consume `+`
                Ok(Expr::UnaryOp(UnaryOpExpr {
                    op: UnaryOperator::Plus,
                    expr: Box::new(self.parse_subexpr(Self::PLUS_MINUS_PREC)?),
                }))
            }
            Some(Token::Asterisk) => {
                self.next_token(); // consume `*`
                Ok(Expr::Wildcard)
            }
            Some(Token::LeftParen) => {
                self.next_token(); // consume `(`
                let expr = self.parse_expr()?;
                self.expect_token(&Token::RightParen)?;
                Ok(Expr::Nested(Box::new(expr)))
            }
            unexpected => self.expected("an expression prefix", unexpected),
        }
    }

    /// Gets the precedence of the next token.
    fn next_precedence(&self) -> u8 {
        match self.peek_token() {
            Some(token) => match token {
                token if token.is_keyword(Keyword::OR) => 5,
                token if token.is_keyword(Keyword::AND) => 10,
                Token::Word(w) if w.keyword == Some(Keyword::NOT) => {
                    // The precedence of NOT varies depending on the keyword
                    // that follows it. If it is followed by IN, BETWEEN or a
                    // text predicate, it takes on their precedence. Otherwise
                    // it is not an infix operator and has zero precedence.
                    match self.peek_nth_token(1) {
                        Some(token)
                            if token
                                .is_one_of_keywords(&[
                                    Keyword::IN,
                                    Keyword::BETWEEN,
                                    Keyword::LIKE,
                                    Keyword::GLOB,
                                    Keyword::REGEXP,
                                    Keyword::MATCH,
                                ])
                                .is_some() =>
                        {
                            Self::LIKE_PREC
                        }
                        _ => 0,
                    }
                }
                token
                    if token
                        .is_one_of_keywords(&[
                            Keyword::IS,
                            Keyword::ISNULL,
                            Keyword::NOTNULL,
                            Keyword::IN,
                            Keyword::BETWEEN,
                            Keyword::LIKE,
                            Keyword::GLOB,
                            Keyword::REGEXP,
                            Keyword::MATCH,
                            Keyword::COLLATE,
                        ])
                        .is_some() =>
                {
                    Self::LIKE_PREC
                }
                Token::Equal
                | Token::NotEqual
                | Token::Less
                | Token::LessOrEqual
                | Token::Greater
                | Token::GreaterOrEqual => Self::CMP_PREC,
                Token::Plus | Token::Minus => Self::PLUS_MINUS_PREC,
                Token::Asterisk | Token::Slash | Token::Percent | Token::Concat => Self::MUL_PREC,
                _ => 0,
            },
            None => 0,
        }
    }

    /// Parses an operator following an expression.
    fn parse_infix(&mut self, expr: Box<Expr>, precedence: u8) -> Result<Expr, ParserError> {
        let token = match self.next_token() {
            Some(token) => token,
            None => return self.expected("an expression infix", Option::<Token>::None),
        };

        let regular_binary_operator = match &token {
            Token::Plus => Some(BinaryOperator::Plus),
            Token::Minus => Some(BinaryOperator::Minus),
            Token::Asterisk => Some(BinaryOperator::Multiply),
            Token::Slash => Some(BinaryOperator::Divide),
            Token::Percent => Some(BinaryOperator::Modulo),

            Token::Greater => Some(BinaryOperator::Greater),
            Token::Less => Some(BinaryOperator::Less),
            Token::GreaterOrEqual => Some(BinaryOperator::GreaterOrEqual),
            Token::LessOrEqual => Some(BinaryOperator::LessOrEqual),
            Token::Equal => Some(BinaryOperator::Equal),
            Token::NotEqual => Some(BinaryOperator::NotEqual),

            Token::Concat => Some(BinaryOperator::StringConcat),

            Token::Word(word) => match word.keyword {
                Some(Keyword::AND) => Some(BinaryOperator::And),
                Some(Keyword::OR) => Some(BinaryOperator::Or),
                _ => None,
            },
            _ => None,
        };

        if let Some(op) = regular_binary_operator {
            let right = self.parse_subexpr(precedence)?;
            return Ok(Expr::BinaryOp(BinaryOpExpr {
                op,
                left: expr,
                right: Box::new(right),
            }));
        }

        if let Token::Word(Word {
            keyword: Some(keyword),
            ..
        }) = token
        {
            match keyword {
                Keyword::IS => {
                    let negated = self.parse_keyword(Keyword::NOT);
                    if self.parse_keyword(Keyword::NULL) {
                        Ok(Expr::IsNull(IsNullExpr { negated, expr }))
                    } else {
                        let found = self.peek_token().cloned();
                        self.expected("[NOT] NULL after IS", found)
                    }
                }
                Keyword::ISNULL => Ok(Expr::IsNull(IsNullExpr {
                    negated: false,
                    expr,
                })),
                Keyword::NOTNULL => Ok(Expr::IsNull(IsNullExpr {
                    negated: true,
                    expr,
                })),
                Keyword::NOT => {
                    if self.parse_keyword(Keyword::IN) {
                        self.parse_in(expr, true)
                    } else if self.parse_keyword(Keyword::BETWEEN) {
                        self.parse_between(expr, true)
                    } else if let Some(op) = self.parse_text_match_op() {
                        self.parse_text_match(expr, op, true)
                    } else {
                        let found = self.peek_token().cloned();
                        self.expected("IN, BETWEEN or a text predicate after NOT", found)
                    }
                }
                Keyword::IN => self.parse_in(expr, false),
                Keyword::BETWEEN => self.parse_between(expr, false),
                Keyword::LIKE => self.parse_text_match(expr, TextMatchOp::Like, false),
                Keyword::GLOB => self.parse_text_match(expr, TextMatchOp::Glob, false),
                Keyword::REGEXP => self.parse_text_match(expr, TextMatchOp::Regexp, false),
                Keyword::MATCH => self.parse_text_match(expr, TextMatchOp::Match, false),
                Keyword::COLLATE => Ok(Expr::Collate(CollateExpr {
                    expr,
                    collation: self.parse_identifier()?,
                })),
                // Can only happen if `next_precedence` got out of sync
                other => Err(ParserError::InvalidKeyword(format!(
                    "no infix parser for {}",
                    other
                ))),
            }
        } else {
            self.expected("an expression infix", Some(token))
        }
    }

    /// Parses the parens following the `[NOT] IN` operator, the `[NOT] IN`
    /// keywords already consumed.
    fn parse_in(&mut self, expr: Box<Expr>, negated: bool) -> Result<Expr, ParserError> {
        self.expect_token(&Token::LeftParen)?;
        let list = self.parse_comma_separated(Parser::parse_expr)?;
        self.expect_token(&Token::RightParen)?;
        Ok(Expr::InList(InListExpr {
            expr,
            negated,
            list,
        }))
    }

    /// Parses `[NOT] BETWEEN <low> AND <high>`, the `[NOT] BETWEEN` keywords
    /// already consumed.
    fn parse_between(&mut self, expr: Box<Expr>, negated: bool) -> Result<Expr, ParserError> {
        // Stop parsing subexpressions for <low> and <high> on tokens with
        // precedence lower than that of `BETWEEN`, such as `AND`.
        let low = self.parse_subexpr(Self::LIKE_PREC)?;
        self.expect_keyword(Keyword::AND)?;
        let high = self.parse_subexpr(Self::LIKE_PREC)?;
        Ok(Expr::Between(BetweenExpr {
            expr,
            negated,
            low: Box::new(low),
            high: Box::new(high),
        }))
    }

    fn parse_text_match_op(&mut self) -> Option<TextMatchOp> {
        match self.parse_one_of_keywords(&[
            Keyword::LIKE,
            Keyword::GLOB,
            Keyword::REGEXP,
            Keyword::MATCH,
        ]) {
            Some(Keyword::LIKE) => Some(TextMatchOp::Like),
            Some(Keyword::GLOB) => Some(TextMatchOp::Glob),
            Some(Keyword::REGEXP) => Some(TextMatchOp::Regexp),
            Some(Keyword::MATCH) => Some(TextMatchOp::Match),
            _ => None,
        }
    }

    fn parse_text_match(
        &mut self,
        expr: Box<Expr>,
        op: TextMatchOp,
        negated: bool,
    ) -> Result<Expr, ParserError> {
        let pattern = self.parse_subexpr(Self::LIKE_PREC)?;
        Ok(Expr::TextMatch(TextMatchExpr {
            op,
            negated,
            expr,
            pattern: Box::new(pattern),
        }))
    }

    /// Parses `CASE [<operand>] WHEN ... THEN ... ELSE <result> END`.
    ///
    /// The `ELSE` branch is mandatory in this dialect.
    fn parse_case_expr(&mut self) -> Result<Expr, ParserError> {
        self.expect_keyword(Keyword::CASE)?;
        let operand = if self.peek_token().map(|t| t.is_keyword(Keyword::WHEN)) == Some(true) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let mut conditions = vec![];
        let mut results = vec![];
        while self.parse_keyword(Keyword::WHEN) {
            conditions.push(self.parse_expr()?);
            self.expect_keyword(Keyword::THEN)?;
            results.push(self.parse_expr()?);
        }
        if conditions.is_empty() {
            let found = self.peek_token().cloned();
            return self.expected("WHEN after CASE", found);
        }
        self.expect_keyword(Keyword::ELSE)?;
        let else_result = Box::new(self.parse_expr()?);
        self.expect_keyword(Keyword::END)?;
        Ok(Expr::Case(CaseExpr {
            operand,
            conditions,
            results,
            else_result,
        }))
    }

    /// Parses `CAST(<expr> AS <type>)`.
    fn parse_cast_expr(&mut self) -> Result<Expr, ParserError> {
        self.expect_keyword(Keyword::CAST)?;
        self.expect_token(&Token::LeftParen)?;
        let expr = Box::new(self.parse_expr()?);
        self.expect_keyword(Keyword::AS)?;
        let data_type = self.parse_data_type()?;
        self.expect_token(&Token::RightParen)?;
        Ok(Expr::Cast(CastExpr { expr, data_type }))
    }

    /// Parses a function call; the name has been peeked but not consumed.
    fn parse_function_expr(&mut self, word: Word) -> Result<Expr, ParserError> {
        let kind = match word.quote {
            None => FunctionKind::from_name(&word.value),
            Some(_) => None,
        };
        let kind = match kind {
            Some(kind) => kind,
            None => return Err(ParserError::UnknownFunctionName(word.value)),
        };
        self.next_token(); // consume the function name
        self.expect_token(&Token::LeftParen)?;
        let distinct = self.parse_keyword(Keyword::DISTINCT);
        let args = if self.next_token_if_is(&Token::RightParen) {
            vec![]
        } else {
            let args = self.parse_comma_separated(Parser::parse_expr)?;
            self.expect_token(&Token::RightParen)?;
            args
        };
        Ok(Expr::Function(Function {
            kind,
            distinct,
            args,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdb_ast::{DataType, Literal};

    fn expr(sql: &str) -> Expr {
        Parser::new_with_sql(sql).unwrap().parse_expr().unwrap()
    }

    #[test]
    fn parse_precedence() {
        // * binds tighter than +
        assert_eq!(expr("1 + 2 * 3").to_string(), "1 + 2 * 3");
        let parsed = expr("1 + 2 * 3");
        match parsed {
            Expr::BinaryOp(op) => {
                assert_eq!(op.op, BinaryOperator::Plus);
                assert!(matches!(*op.right, Expr::BinaryOp(_)));
            }
            other => panic!("expected binary op, got {:?}", other),
        }
        // comparison binds tighter than AND, AND tighter than OR
        let parsed = expr("a = 1 AND b = 2 OR c = 3");
        match parsed {
            Expr::BinaryOp(op) => assert_eq!(op.op, BinaryOperator::Or),
            other => panic!("expected binary op, got {:?}", other),
        }
    }

    #[test]
    fn parse_unary() {
        assert_eq!(
            expr("-1"),
            Expr::UnaryOp(UnaryOpExpr {
                op: UnaryOperator::Minus,
                expr: Box::new(Expr::Literal(Literal::Number("1".into()))),
            })
        );
        assert_eq!(expr("NOT a AND b").to_string(), "NOT a AND b");
    }

    #[test]
    fn parse_compound_identifier() {
        assert_eq!(
            expr("x.k"),
            Expr::CompoundIdentifier(vec![Ident::new("x"), Ident::new("k")])
        );
        assert_eq!(
            expr("x.*"),
            Expr::QualifiedWildcard(ObjectName::new(vec!["x"]))
        );
    }

    #[test]
    fn parse_between() {
        assert_eq!(
            expr("v BETWEEN 1 AND 9 AND w"),
            Expr::BinaryOp(BinaryOpExpr {
                op: BinaryOperator::And,
                left: Box::new(Expr::Between(BetweenExpr {
                    expr: Box::new(Expr::Identifier(Ident::new("v"))),
                    negated: false,
                    low: Box::new(Expr::Literal(Literal::Number("1".into()))),
                    high: Box::new(Expr::Literal(Literal::Number("9".into()))),
                })),
                right: Box::new(Expr::Identifier(Ident::new("w"))),
            })
        );
    }

    #[test]
    fn parse_in_list() {
        assert_eq!(
            expr("g NOT IN (1, 2)"),
            Expr::InList(InListExpr {
                expr: Box::new(Expr::Identifier(Ident::new("g"))),
                negated: true,
                list: vec![
                    Expr::Literal(Literal::Number("1".into())),
                    Expr::Literal(Literal::Number("2".into())),
                ],
            })
        );
    }

    #[test]
    fn parse_is_null() {
        assert_eq!(expr("a IS NULL").to_string(), "a IS NULL");
        assert_eq!(expr("a IS NOT NULL").to_string(), "a IS NOT NULL");
        assert_eq!(expr("a ISNULL").to_string(), "a IS NULL");
        assert_eq!(expr("a NOTNULL").to_string(), "a IS NOT NULL");
    }

    #[test]
    fn parse_text_predicates() {
        assert_eq!(expr("name LIKE 'b%'").to_string(), "name LIKE 'b%'");
        assert_eq!(expr("name NOT GLOB 'b*'").to_string(), "name NOT GLOB 'b*'");
        assert_eq!(expr("name REGEXP '^b'").to_string(), "name REGEXP '^b'");
    }

    #[test]
    fn parse_case() {
        assert_eq!(
            expr("CASE g WHEN 1 THEN 'one' ELSE 'other' END").to_string(),
            "CASE g WHEN 1 THEN 'one' ELSE 'other' END"
        );
        // the ELSE branch is mandatory
        assert!(Parser::new_with_sql("CASE WHEN a THEN 1 END")
            .unwrap()
            .parse_expr()
            .is_err());
    }

    #[test]
    fn parse_cast() {
        assert_eq!(
            expr("CAST('42' AS INTEGER)"),
            Expr::Cast(CastExpr {
                expr: Box::new(Expr::Literal(Literal::String("42".into()))),
                data_type: DataType::Integer,
            })
        );
    }

    #[test]
    fn parse_function_call() {
        assert_eq!(
            expr("COUNT(*)"),
            Expr::Function(Function {
                kind: FunctionKind::Count,
                distinct: false,
                args: vec![Expr::Wildcard],
            })
        );
        assert_eq!(expr("COUNT(DISTINCT g)").to_string(), "COUNT(DISTINCT g)");
        assert_eq!(
            Parser::new_with_sql("nonsense(1)").unwrap().parse_expr(),
            Err(ParserError::UnknownFunctionName("nonsense".into()))
        );
    }

    #[test]
    fn parse_nested() {
        assert_eq!(expr("(1 + 2) * 3").to_string(), "(1 + 2) * 3");
        assert!(matches!(
            Parser::new_with_sql("(1 + 2").unwrap().parse_expr(),
            Err(ParserError::MismatchedParenthesis(_))
        ));
    }
}
