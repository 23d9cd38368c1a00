use memdb_ast::{Assignment, DeleteStmt, InsertSource, InsertStmt, UpdateStmt};
use memdb_lexer::{Keyword, Token};

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Parses an `INSERT` statement.
    ///
    /// ```txt
    /// INSERT [ OR <conflict action> ] INTO <table name> [ ( <column> [, ...] ) ]
    ///     { VALUES ( <expr> [, ...] ) [, ...] | <query expression> | DEFAULT VALUES }
    /// ```
    pub fn parse_insert_stmt(&mut self) -> Result<InsertStmt, ParserError> {
        self.expect_keyword(Keyword::INSERT)?;
        let action = if self.parse_keyword(Keyword::OR) {
            Some(self.parse_conflict_action()?)
        } else {
            None
        };
        self.expect_keyword(Keyword::INTO)?;
        let table = self.parse_identifier()?;

        let columns = if self.next_token_if_is(&Token::LeftParen) {
            let columns = self.parse_comma_separated(Self::parse_identifier)?;
            self.expect_token(&Token::RightParen)?;
            columns
        } else {
            vec![]
        };

        let source = if self.parse_keywords(&[Keyword::DEFAULT, Keyword::VALUES]) {
            InsertSource::DefaultValues
        } else if self.parse_keyword(Keyword::VALUES) {
            let rows = self.parse_comma_separated(|parser| {
                parser.expect_token(&Token::LeftParen)?;
                let row = parser.parse_comma_separated(Parser::parse_expr)?;
                parser.expect_token(&Token::RightParen)?;
                Ok(row)
            })?;
            InsertSource::Values(rows)
        } else if matches!(self.peek_token(), Some(t) if t.is_keyword(Keyword::SELECT)) {
            InsertSource::Query(Box::new(self.parse_query()?))
        } else {
            let found = self.peek_token().cloned();
            return self.expected("VALUES, SELECT or DEFAULT VALUES", found);
        };

        Ok(InsertStmt {
            action,
            table,
            columns,
            source,
        })
    }

    /// Parses an `UPDATE` statement.
    ///
    /// ```txt
    /// UPDATE [ OR <conflict action> ] <table> SET <column> = <expr> [, ...]
    ///     [ WHERE <search condition> ]
    /// ```
    pub fn parse_update_stmt(&mut self) -> Result<UpdateStmt, ParserError> {
        self.expect_keyword(Keyword::UPDATE)?;
        let action = if self.parse_keyword(Keyword::OR) {
            Some(self.parse_conflict_action()?)
        } else {
            None
        };
        let table = self.parse_identifier()?;
        self.expect_keyword(Keyword::SET)?;
        let assignments = self.parse_comma_separated(|parser| {
            let target = parser.parse_identifier()?;
            parser.expect_token(&Token::Equal)?;
            let value = parser.parse_expr()?;
            Ok(Assignment { target, value })
        })?;
        let selection = self.parse_where_clause()?;
        Ok(UpdateStmt {
            action,
            table,
            assignments,
            selection,
        })
    }

    /// Parses a `DELETE` statement.
    ///
    /// ```txt
    /// DELETE FROM <table> [ WHERE <search condition> ]
    /// ```
    pub fn parse_delete_stmt(&mut self) -> Result<DeleteStmt, ParserError> {
        self.expect_keywords(&[Keyword::DELETE, Keyword::FROM])?;
        let table = self.parse_identifier()?;
        let selection = self.parse_where_clause()?;
        Ok(DeleteStmt { table, selection })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdb_ast::{ConflictAction, Expr, Ident, Literal, Where};

    #[test]
    fn parse_insert_values() -> Result<(), ParserError> {
        let stmt = Parser::new_with_sql("INSERT INTO parts (name) VALUES ('bolt')")?
            .parse_insert_stmt()?;
        assert_eq!(stmt.table, Ident::new("parts"));
        assert_eq!(stmt.columns, vec![Ident::new("name")]);
        assert_eq!(
            stmt.source,
            InsertSource::Values(vec![vec![Expr::Literal(Literal::String("bolt".into()))]])
        );
        Ok(())
    }

    #[test]
    fn parse_insert_multi_row_values() -> Result<(), ParserError> {
        let stmt =
            Parser::new_with_sql("INSERT INTO a VALUES (1, 1), (2, 1), (3, 2)")?
                .parse_insert_stmt()?;
        match stmt.source {
            InsertSource::Values(rows) => assert_eq!(rows.len(), 3),
            other => panic!("expected values, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn parse_insert_or_action() -> Result<(), ParserError> {
        let stmt = Parser::new_with_sql("INSERT OR REPLACE INTO t VALUES (1)")?
            .parse_insert_stmt()?;
        assert_eq!(stmt.action, Some(ConflictAction::Replace));
        let stmt =
            Parser::new_with_sql("INSERT OR IGNORE INTO t VALUES (1)")?.parse_insert_stmt()?;
        assert_eq!(stmt.action, Some(ConflictAction::Ignore));
        Ok(())
    }

    #[test]
    fn parse_insert_default_values() -> Result<(), ParserError> {
        let stmt =
            Parser::new_with_sql("INSERT INTO t DEFAULT VALUES")?.parse_insert_stmt()?;
        assert_eq!(stmt.source, InsertSource::DefaultValues);
        Ok(())
    }

    #[test]
    fn parse_insert_from_select() -> Result<(), ParserError> {
        let stmt = Parser::new_with_sql("INSERT INTO dst (a) SELECT a FROM src")?
            .parse_insert_stmt()?;
        assert!(matches!(stmt.source, InsertSource::Query(_)));
        Ok(())
    }

    #[test]
    fn parse_update_stmt() -> Result<(), ParserError> {
        let stmt = Parser::new_with_sql("UPDATE t SET a = 1, b = 'x' WHERE id = 3")?
            .parse_update_stmt()?;
        assert_eq!(stmt.assignments.len(), 2);
        assert_eq!(stmt.assignments[0].target, Ident::new("a"));
        assert!(stmt.selection.is_some());
        Ok(())
    }

    #[test]
    fn parse_delete_stmt() -> Result<(), ParserError> {
        let stmt = Parser::new_with_sql("DELETE FROM t")?.parse_delete_stmt()?;
        assert_eq!(
            stmt,
            DeleteStmt {
                table: Ident::new("t"),
                selection: None,
            }
        );
        let stmt = Parser::new_with_sql("DELETE FROM t WHERE id = 1")?.parse_delete_stmt()?;
        assert!(matches!(stmt.selection, Some(Where { .. })));
        Ok(())
    }
}
