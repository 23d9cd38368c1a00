mod expression;
mod query;
mod statement;
mod types;

use core::fmt::Display;

use memdb_ast::Stmt;
use memdb_lexer::{Keyword, Lexer, Token, Word};

use crate::error::ParserError;

/// SQL Parser
///
/// A predictive recursive-descent parser over a token cursor: a plain index
/// into the token vector, so arbitrary lookahead is a slice access and
/// backtracking is an index assignment.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// Creates a new SQL parser with the given tokens.
    pub fn new_with_tokens(tokens: Vec<Token>) -> Self {
        // ignore whitespace and comments.
        let tokens = tokens
            .into_iter()
            .filter(|token| !token.is_whitespace() && !token.is_comment())
            .collect();
        Self { tokens, index: 0 }
    }

    /// Creates a new SQL parser with the given sql string.
    pub fn new_with_sql(sql: &str) -> Result<Self, ParserError> {
        let tokens = Lexer::new(sql).tokenize()?;
        Ok(Self::new_with_tokens(tokens))
    }

    /// Parses a semicolon-separated list of statements.
    pub fn parse_statements(sql: &str) -> Result<Vec<Stmt>, ParserError> {
        let mut parser = Self::new_with_sql(sql)?;
        let mut statements = vec![];
        loop {
            // consume empty statements
            while parser.next_token_if_is(&Token::SemiColon) {}
            if parser.peek_token().is_none() {
                break;
            }
            statements.push(parser.parse_statement()?);
            match parser.peek_token() {
                Some(Token::SemiColon) | None => (),
                Some(unexpected) => {
                    let unexpected = unexpected.clone();
                    return parser.expected("; or end of statement", Some(unexpected));
                }
            }
        }
        Ok(statements)
    }

    /// Parse a comma-separated list of 1+ items accepted by `F`.
    pub fn parse_comma_separated<T, F>(&mut self, mut f: F) -> Result<Vec<T>, ParserError>
    where
        F: FnMut(&mut Parser) -> Result<T, ParserError>,
    {
        let mut values = vec![];
        loop {
            values.push(f(self)?);
            if !self.next_token_if_is(&Token::Comma) {
                break;
            }
        }
        Ok(values)
    }

    /// Report an unexpected token.
    pub fn expected<R>(
        &self,
        expected: impl Display,
        found: Option<impl Display>,
    ) -> Result<R, ParserError> {
        Err(ParserError::MalformedSqlCommand(if let Some(found) = found {
            format!("Expected: {}, found: {}", expected, found)
        } else {
            format!("Expected: {}, but not found", expected)
        }))
    }

    /// Consumes the next keyword token and returns ok if it matches the
    /// expected keyword, otherwise returns an error.
    pub fn expect_keyword(&mut self, expected: Keyword) -> Result<(), ParserError> {
        if self.parse_keyword(expected) {
            Ok(())
        } else {
            let found = self.peek_token().cloned();
            self.expected(expected, found)
        }
    }

    /// Consumes the next keyword tokens if they match the expected keywords,
    /// otherwise returns an error.
    pub fn expect_keywords(&mut self, expected: &[Keyword]) -> Result<(), ParserError> {
        for &kw in expected {
            self.expect_keyword(kw)?;
        }
        Ok(())
    }

    /// Consumes the next keyword token if the token is one of the expected
    /// keywords, otherwise returns an error.
    pub fn expect_one_of_keywords(&mut self, keywords: &[Keyword]) -> Result<Keyword, ParserError> {
        if let Some(keyword) = self.parse_one_of_keywords(keywords) {
            Ok(keyword)
        } else {
            let found = self.peek_token().cloned();
            self.expected(format!("one of {:?}", keywords), found)
        }
    }

    /// Consumes the next keyword token and returns true if it matches the
    /// expected keyword, otherwise returns false.
    pub fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        self.next_token_if(|token| token.is_keyword(keyword))
            .is_some()
    }

    /// Consumes the next tokens if they are exactly the expected keyword
    /// sequence; consumes nothing otherwise.
    pub fn parse_keywords(&mut self, keywords: &[Keyword]) -> bool {
        let start = self.index;
        for &keyword in keywords {
            if !self.parse_keyword(keyword) {
                self.index = start;
                return false;
            }
        }
        true
    }

    /// Consumes the next keyword token if the token is one of the expected keywords.
    pub fn parse_one_of_keywords(&mut self, keywords: &[Keyword]) -> Option<Keyword> {
        match self.peek_token() {
            Some(token) => {
                if let Some(keyword) = token.is_one_of_keywords(keywords) {
                    self.next_token();
                    Some(keyword)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Consumes the next token and returns ok if it matches the expected
    /// token, otherwise returns an error. A missing `)` is reported as a
    /// mismatched parenthesis.
    pub fn expect_token(&mut self, expected: &Token) -> Result<(), ParserError> {
        if self.next_token_if_is(expected) {
            Ok(())
        } else {
            let found = self.peek_token().cloned();
            if *expected == Token::RightParen || *expected == Token::LeftParen {
                Err(ParserError::MismatchedParenthesis(match found {
                    Some(found) => format!("Expected: {}, found: {}", expected, found),
                    None => format!("Expected: {}, but not found", expected),
                }))
            } else {
                self.expected(expected, found)
            }
        }
    }

    /// Returns a reference to the next token without advancing the cursor.
    pub fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Peeks `n` tokens past the next one without advancing the cursor.
    pub fn peek_nth_token(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.index + n)
    }

    /// Consumes the next token and returns it.
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Consumes and returns the next token if `func` returns true for it.
    pub fn next_token_if(&mut self, func: impl FnOnce(&Token) -> bool) -> Option<Token> {
        match self.peek_token() {
            Some(token) if func(token) => self.next_token(),
            _ => None,
        }
    }

    /// Consumes the next token and returns true if it matches the expected
    /// token, otherwise returns false.
    pub fn next_token_if_is(&mut self, expected: &Token) -> bool {
        self.next_token_if(|token| token == expected).is_some()
    }

    /// Parses one statement, dispatching on the leading keyword.
    pub fn parse_statement(&mut self) -> Result<Stmt, ParserError> {
        match self.peek_token() {
            Some(Token::Word(Word {
                keyword: Some(keyword),
                ..
            })) => match keyword {
                Keyword::CREATE => self.parse_create_stmt(),
                Keyword::ALTER => Ok(Stmt::AlterTable(self.parse_alter_table_stmt()?)),
                Keyword::DROP => Ok(Stmt::Drop(self.parse_drop_stmt()?)),
                Keyword::INSERT => Ok(Stmt::Insert(self.parse_insert_stmt()?)),
                Keyword::UPDATE => Ok(Stmt::Update(self.parse_update_stmt()?)),
                Keyword::DELETE => Ok(Stmt::Delete(self.parse_delete_stmt()?)),
                Keyword::SELECT => Ok(Stmt::Select(self.parse_select_stmt()?)),
                Keyword::BEGIN => Ok(Stmt::Begin(self.parse_begin_stmt()?)),
                Keyword::COMMIT | Keyword::END => Ok(Stmt::Commit(self.parse_commit_stmt()?)),
                Keyword::ROLLBACK => Ok(Stmt::Rollback(self.parse_rollback_stmt()?)),
                Keyword::SAVEPOINT => Ok(Stmt::Savepoint(self.parse_savepoint_stmt()?)),
                Keyword::RELEASE => Ok(Stmt::Release(self.parse_release_stmt()?)),
                other => Err(ParserError::InvalidKeyword(format!(
                    "{} cannot start a statement",
                    other
                ))),
            },
            Some(Token::Word(word)) => Err(ParserError::UnknownKeyword(word.value.clone())),
            Some(unexpected) => {
                let unexpected = unexpected.clone();
                self.expected("a statement", Some(unexpected))
            }
            None => self.expected("a statement", Option::<Token>::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_statements_splits_on_semicolon() -> Result<(), ParserError> {
        let stmts = Parser::parse_statements("BEGIN; COMMIT;")?;
        assert_eq!(stmts.len(), 2);
        Ok(())
    }

    #[test]
    fn empty_statements_are_skipped() -> Result<(), ParserError> {
        let stmts = Parser::parse_statements(";;  ;")?;
        assert!(stmts.is_empty());
        Ok(())
    }

    #[test]
    fn unknown_leading_word() {
        let err = Parser::parse_statements("frobnicate the table").unwrap_err();
        assert_eq!(err, ParserError::UnknownKeyword("frobnicate".into()));
    }

    #[test]
    fn keyword_in_wrong_position() {
        let err = Parser::parse_statements("WHERE 1").unwrap_err();
        assert!(matches!(err, ParserError::InvalidKeyword(_)));
    }

    /// Rendering a parsed statement and parsing it again yields an equal
    /// tree.
    #[test]
    fn parse_round_trip() -> Result<(), ParserError> {
        let samples = [
            "CREATE TABLE parts (part_id INTEGER PRIMARY KEY AUTOINCREMENT, \
             stock INTEGER DEFAULT 0 NOT NULL, name TEXT)",
            "CREATE TABLE IF NOT EXISTS t (id INTEGER, v INTEGER CHECK (v > 0), \
             PRIMARY KEY (id))",
            "CREATE TABLE copy AS SELECT a, b FROM src WHERE a > 1",
            "ALTER TABLE t RENAME TO u",
            "ALTER TABLE t ADD COLUMN w INTEGER DEFAULT 9",
            "DROP TABLE IF EXISTS t",
            "INSERT OR REPLACE INTO t (a, b) VALUES (1, 'x'), (2, 'y')",
            "INSERT INTO t DEFAULT VALUES",
            "INSERT INTO t SELECT a, b FROM src",
            "UPDATE OR IGNORE t SET a = a + 1 WHERE b LIKE 'x%'",
            "DELETE FROM t WHERE a IN (1, 2, 3)",
            "SELECT DISTINCT x.v, y.w AS col FROM x AS a LEFT OUTER JOIN y ON x.k = y.k \
             WHERE x.v IS NOT NULL GROUP BY x.v HAVING COUNT(*) > 1 \
             ORDER BY x.v DESC LIMIT 10 OFFSET 2",
            "SELECT * FROM a NATURAL JOIN b CROSS JOIN c",
            "SELECT CASE g WHEN 1 THEN 'one' ELSE 'other' END AS kind FROM t",
            "SELECT CAST('42' AS INTEGER) + 1 AS z",
            "BEGIN IMMEDIATE",
            "COMMIT",
            "ROLLBACK",
        ];
        for sql in samples {
            let parsed = Parser::parse_statements(sql)?;
            let rendered = parsed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            let reparsed = Parser::parse_statements(&rendered)?;
            assert_eq!(parsed, reparsed, "round trip failed for {:?}", sql);
        }
        Ok(())
    }
}
