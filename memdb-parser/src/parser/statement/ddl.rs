use memdb_ast::{
    AlterTableAction, AlterTableStmt, ColumnConstraint, ColumnDef, ConflictAction,
    CreateIndexStmt, CreateTableStmt, CreateTriggerStmt, CreateViewStmt, DropStmt, ObjectType,
    Stmt, TableConstraint, TableContent,
};
use memdb_lexer::{Keyword, Token, Word};

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Dispatches a statement starting with `CREATE`.
    pub(crate) fn parse_create_stmt(&mut self) -> Result<Stmt, ParserError> {
        match self.peek_nth_token(1) {
            Some(Token::Word(Word {
                keyword: Some(keyword),
                ..
            })) => match keyword {
                Keyword::TABLE => Ok(Stmt::CreateTable(self.parse_create_table_stmt()?)),
                Keyword::UNIQUE | Keyword::INDEX => {
                    Ok(Stmt::CreateIndex(self.parse_create_index_stmt()?))
                }
                Keyword::VIEW => Ok(Stmt::CreateView(self.parse_create_view_stmt()?)),
                Keyword::TRIGGER => Ok(Stmt::CreateTrigger(self.parse_create_trigger_stmt()?)),
                other => Err(ParserError::InvalidKeyword(format!(
                    "CREATE {} is not supported",
                    other
                ))),
            },
            found => {
                let found = found.cloned();
                self.expected("TABLE, INDEX, VIEW or TRIGGER after CREATE", found)
            }
        }
    }

    /// Parses a `CREATE TABLE` statement.
    ///
    /// ```txt
    /// CREATE TABLE [ IF NOT EXISTS ] <table name>
    ///     { ( <column definition> [, ...] [, <table constraint> [, ...] ] )
    ///     | AS <query expression> }
    /// ```
    pub fn parse_create_table_stmt(&mut self) -> Result<CreateTableStmt, ParserError> {
        self.expect_keywords(&[Keyword::CREATE, Keyword::TABLE])?;
        let if_not_exists = self.parse_keywords(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS]);
        let name = self.parse_identifier()?;
        let content = self.parse_table_content()?;
        Ok(CreateTableStmt {
            if_not_exists,
            name,
            content,
        })
    }

    /// Parses the content of a table definition.
    fn parse_table_content(&mut self) -> Result<TableContent, ParserError> {
        if self.parse_keyword(Keyword::AS) {
            return Ok(TableContent::Query(Box::new(self.parse_query()?)));
        }
        self.expect_token(&Token::LeftParen)?;
        let mut columns = vec![];
        let mut constraints = vec![];
        loop {
            if let Some(constraint) = self.parse_table_constraint()? {
                constraints.push(constraint);
            } else if matches!(self.peek_token(), Some(Token::Word(_))) {
                columns.push(self.parse_column_def()?);
            } else {
                let found = self.peek_token().cloned();
                return self.expected("column definition or table constraint", found);
            }
            let comma = self.next_token_if_is(&Token::Comma);
            if self.next_token_if_is(&Token::RightParen) {
                break;
            } else if !comma {
                let found = self.peek_token().cloned();
                return self.expected(", or ) after column definition or table constraint", found);
            }
        }
        Ok(TableContent::Columns {
            columns,
            constraints,
        })
    }

    /// Parses a column definition.
    ///
    /// ```txt
    /// <column definition> ::= <column name> [ <data type> ] [ <column constraint> ... ]
    /// ```
    pub(crate) fn parse_column_def(&mut self) -> Result<ColumnDef, ParserError> {
        let name = self.parse_identifier()?;
        // a bare word that does not start a constraint is the type name
        let data_type = match self.peek_token() {
            Some(Token::Word(w)) if !starts_column_constraint(w) => self.parse_data_type()?,
            _ => memdb_ast::DataType::None,
        };
        let mut constraints = vec![];
        while let Some(constraint) = self.parse_column_constraint()? {
            constraints.push(constraint);
        }
        Ok(ColumnDef {
            name,
            data_type,
            constraints,
        })
    }

    /// Parses a single column constraint, or returns `None`.
    ///
    /// ```txt
    /// <column constraint> ::=
    ///     PRIMARY KEY [ ASC | DESC ] [ <conflict clause> ] [ AUTOINCREMENT ]
    ///     | NOT NULL [ <conflict clause> ]
    ///     | UNIQUE [ <conflict clause> ]
    ///     | CHECK ( <search condition> )
    ///     | DEFAULT <expr>
    ///     | COLLATE <collation name>
    ///     | REFERENCES <table> [ ( <column> [, ...] ) ]
    /// ```
    fn parse_column_constraint(&mut self) -> Result<Option<ColumnConstraint>, ParserError> {
        if self.parse_keywords(&[Keyword::PRIMARY, Keyword::KEY]) {
            let asc = match self.parse_one_of_keywords(&[Keyword::ASC, Keyword::DESC]) {
                Some(Keyword::ASC) => Some(true),
                Some(Keyword::DESC) => Some(false),
                _ => None,
            };
            let conflict = self.parse_conflict_clause()?;
            let autoincrement = self.parse_keyword(Keyword::AUTOINCREMENT);
            Ok(Some(ColumnConstraint::PrimaryKey {
                asc,
                autoincrement,
                conflict,
            }))
        } else if self.parse_keywords(&[Keyword::NOT, Keyword::NULL]) {
            let conflict = self.parse_conflict_clause()?;
            Ok(Some(ColumnConstraint::NotNull { conflict }))
        } else if self.parse_keyword(Keyword::UNIQUE) {
            let conflict = self.parse_conflict_clause()?;
            Ok(Some(ColumnConstraint::Unique { conflict }))
        } else if self.parse_keyword(Keyword::CHECK) {
            self.expect_token(&Token::LeftParen)?;
            let expr = Box::new(self.parse_expr()?);
            self.expect_token(&Token::RightParen)?;
            Ok(Some(ColumnConstraint::Check(expr)))
        } else if self.parse_keyword(Keyword::DEFAULT) {
            let expr = Box::new(self.parse_expr()?);
            Ok(Some(ColumnConstraint::Default(expr)))
        } else if self.parse_keyword(Keyword::COLLATE) {
            Ok(Some(ColumnConstraint::Collate(self.parse_identifier()?)))
        } else if self.parse_keyword(Keyword::REFERENCES) {
            let table = self.parse_identifier()?;
            let columns = if self.next_token_if_is(&Token::LeftParen) {
                let columns = self.parse_comma_separated(Self::parse_identifier)?;
                self.expect_token(&Token::RightParen)?;
                columns
            } else {
                vec![]
            };
            Ok(Some(ColumnConstraint::References { table, columns }))
        } else {
            Ok(None)
        }
    }

    /// Parses a table-level constraint, or returns `None`.
    ///
    /// ```txt
    /// <table constraint> ::=
    ///     PRIMARY KEY ( <column> [, ...] ) [ <conflict clause> ]
    ///     | UNIQUE ( <column> [, ...] ) [ <conflict clause> ]
    ///     | CHECK ( <search condition> )
    ///     | FOREIGN KEY ( <column> [, ...] ) REFERENCES <table> [ ( <column> [, ...] ) ]
    /// ```
    fn parse_table_constraint(&mut self) -> Result<Option<TableConstraint>, ParserError> {
        // `PRIMARY KEY` and `UNIQUE` are table constraints only when followed
        // by a parenthesized column list; otherwise they belong to a column.
        if matches!(self.peek_token(), Some(t) if t.is_keyword(Keyword::PRIMARY))
            && self.peek_nth_token(2) == Some(&Token::LeftParen)
        {
            self.expect_keywords(&[Keyword::PRIMARY, Keyword::KEY])?;
            self.expect_token(&Token::LeftParen)?;
            let columns = self.parse_comma_separated(Self::parse_identifier)?;
            self.expect_token(&Token::RightParen)?;
            let conflict = self.parse_conflict_clause()?;
            Ok(Some(TableConstraint::PrimaryKey { columns, conflict }))
        } else if matches!(self.peek_token(), Some(t) if t.is_keyword(Keyword::UNIQUE))
            && self.peek_nth_token(1) == Some(&Token::LeftParen)
        {
            self.expect_keyword(Keyword::UNIQUE)?;
            self.expect_token(&Token::LeftParen)?;
            let columns = self.parse_comma_separated(Self::parse_identifier)?;
            self.expect_token(&Token::RightParen)?;
            let conflict = self.parse_conflict_clause()?;
            Ok(Some(TableConstraint::Unique { columns, conflict }))
        } else if matches!(self.peek_token(), Some(t) if t.is_keyword(Keyword::CHECK))
            && self.peek_nth_token(1) == Some(&Token::LeftParen)
        {
            self.expect_keyword(Keyword::CHECK)?;
            self.expect_token(&Token::LeftParen)?;
            let expr = Box::new(self.parse_expr()?);
            self.expect_token(&Token::RightParen)?;
            Ok(Some(TableConstraint::Check(expr)))
        } else if self.parse_keywords(&[Keyword::FOREIGN, Keyword::KEY]) {
            self.expect_token(&Token::LeftParen)?;
            let columns = self.parse_comma_separated(Self::parse_identifier)?;
            self.expect_token(&Token::RightParen)?;
            self.expect_keyword(Keyword::REFERENCES)?;
            let table = self.parse_identifier()?;
            let referenced_columns = if self.next_token_if_is(&Token::LeftParen) {
                let columns = self.parse_comma_separated(Self::parse_identifier)?;
                self.expect_token(&Token::RightParen)?;
                columns
            } else {
                vec![]
            };
            Ok(Some(TableConstraint::ForeignKey {
                columns,
                table,
                referenced_columns,
            }))
        } else {
            Ok(None)
        }
    }

    /// Parses `ON CONFLICT { ROLLBACK | ABORT | FAIL | IGNORE | REPLACE }`.
    fn parse_conflict_clause(&mut self) -> Result<Option<ConflictAction>, ParserError> {
        if !self.parse_keywords(&[Keyword::ON, Keyword::CONFLICT]) {
            return Ok(None);
        }
        Ok(Some(self.parse_conflict_action()?))
    }

    /// Parses one of the conflict action keywords.
    pub(crate) fn parse_conflict_action(&mut self) -> Result<ConflictAction, ParserError> {
        match self.expect_one_of_keywords(&[
            Keyword::ROLLBACK,
            Keyword::ABORT,
            Keyword::FAIL,
            Keyword::IGNORE,
            Keyword::REPLACE,
        ])? {
            Keyword::ROLLBACK => Ok(ConflictAction::Rollback),
            Keyword::ABORT => Ok(ConflictAction::Abort),
            Keyword::FAIL => Ok(ConflictAction::Fail),
            Keyword::IGNORE => Ok(ConflictAction::Ignore),
            Keyword::REPLACE => Ok(ConflictAction::Replace),
            _ => unreachable!(),
        }
    }

    /// Parses an `ALTER TABLE` statement.
    ///
    /// ```txt
    /// ALTER TABLE <table name> { RENAME TO <new name> | ADD [ COLUMN ] <column definition> }
    /// ```
    pub fn parse_alter_table_stmt(&mut self) -> Result<AlterTableStmt, ParserError> {
        self.expect_keywords(&[Keyword::ALTER, Keyword::TABLE])?;
        let name = self.parse_identifier()?;
        let action = if self.parse_keyword(Keyword::RENAME) {
            self.expect_keyword(Keyword::TO)?;
            AlterTableAction::RenameTo(self.parse_identifier()?)
        } else if self.parse_keyword(Keyword::ADD) {
            self.parse_keyword(Keyword::COLUMN);
            AlterTableAction::AddColumn(self.parse_column_def()?)
        } else {
            let found = self.peek_token().cloned();
            return self.expected("RENAME TO or ADD COLUMN", found);
        };
        Ok(AlterTableStmt { name, action })
    }

    /// Parses a `DROP { TABLE | INDEX | TRIGGER | VIEW } [ IF EXISTS ] <name>`
    /// statement.
    pub fn parse_drop_stmt(&mut self) -> Result<DropStmt, ParserError> {
        self.expect_keyword(Keyword::DROP)?;
        let ty = match self.expect_one_of_keywords(&[
            Keyword::TABLE,
            Keyword::INDEX,
            Keyword::TRIGGER,
            Keyword::VIEW,
        ])? {
            Keyword::TABLE => ObjectType::Table,
            Keyword::INDEX => ObjectType::Index,
            Keyword::TRIGGER => ObjectType::Trigger,
            Keyword::VIEW => ObjectType::View,
            _ => unreachable!(),
        };
        let if_exists = self.parse_keywords(&[Keyword::IF, Keyword::EXISTS]);
        let name = self.parse_identifier()?;
        Ok(DropStmt {
            ty,
            if_exists,
            name,
        })
    }

    /// Parses a `CREATE [ UNIQUE ] INDEX` statement.
    ///
    /// ```txt
    /// CREATE [ UNIQUE ] INDEX [ IF NOT EXISTS ] <name> ON <table> ( <column> [, ...] )
    /// ```
    pub fn parse_create_index_stmt(&mut self) -> Result<CreateIndexStmt, ParserError> {
        self.expect_keyword(Keyword::CREATE)?;
        let unique = self.parse_keyword(Keyword::UNIQUE);
        self.expect_keyword(Keyword::INDEX)?;
        let if_not_exists = self.parse_keywords(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS]);
        let name = self.parse_identifier()?;
        self.expect_keyword(Keyword::ON)?;
        let table = self.parse_identifier()?;
        self.expect_token(&Token::LeftParen)?;
        let columns = self.parse_comma_separated(Self::parse_identifier)?;
        self.expect_token(&Token::RightParen)?;
        Ok(CreateIndexStmt {
            unique,
            if_not_exists,
            name,
            table,
            columns,
        })
    }

    /// Parses a `CREATE VIEW` statement.
    ///
    /// ```txt
    /// CREATE VIEW [ IF NOT EXISTS ] <name> AS <query expression>
    /// ```
    pub fn parse_create_view_stmt(&mut self) -> Result<CreateViewStmt, ParserError> {
        self.expect_keywords(&[Keyword::CREATE, Keyword::VIEW])?;
        let if_not_exists = self.parse_keywords(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS]);
        let name = self.parse_identifier()?;
        self.expect_keyword(Keyword::AS)?;
        let query = Box::new(self.parse_query()?);
        Ok(CreateViewStmt {
            if_not_exists,
            name,
            query,
        })
    }

    /// Parses a `CREATE TRIGGER` statement.
    ///
    /// The body is not interpreted: everything up to the closing `END` (or
    /// the statement terminator when there is no `BEGIN` block) is kept as
    /// raw token text, because execution rejects triggers anyway.
    pub fn parse_create_trigger_stmt(&mut self) -> Result<CreateTriggerStmt, ParserError> {
        self.expect_keywords(&[Keyword::CREATE, Keyword::TRIGGER])?;
        let if_not_exists = self.parse_keywords(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS]);
        let name = self.parse_identifier()?;

        let mut body_tokens: Vec<String> = vec![];
        let mut in_block = false;
        loop {
            match self.peek_token() {
                None => break,
                Some(Token::SemiColon) if !in_block => break,
                Some(_) => (),
            }
            if let Some(token) = self.next_token() {
                let is_begin = token.is_keyword(Keyword::BEGIN);
                let is_end = token.is_keyword(Keyword::END);
                body_tokens.push(token.to_string());
                if is_begin {
                    in_block = true;
                }
                if is_end && in_block {
                    break;
                }
            }
        }
        Ok(CreateTriggerStmt {
            if_not_exists,
            name,
            body: body_tokens.join(" "),
        })
    }
}

/// Whether a word begins a column constraint rather than a type name.
fn starts_column_constraint(word: &Word) -> bool {
    matches!(
        word.keyword,
        Some(Keyword::PRIMARY)
            | Some(Keyword::NOT)
            | Some(Keyword::UNIQUE)
            | Some(Keyword::CHECK)
            | Some(Keyword::DEFAULT)
            | Some(Keyword::COLLATE)
            | Some(Keyword::REFERENCES)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdb_ast::{DataType, Expr, Ident, Literal};

    #[test]
    fn parse_create_table_stmt() -> Result<(), ParserError> {
        let sql = "CREATE TABLE foo (bar INT, baz VARCHAR(10), PRIMARY KEY (bar))";
        assert_eq!(
            Parser::new_with_sql(sql)?.parse_create_table_stmt()?,
            CreateTableStmt {
                if_not_exists: false,
                name: Ident::new("foo"),
                content: TableContent::Columns {
                    columns: vec![
                        ColumnDef {
                            name: Ident::new("bar"),
                            data_type: DataType::Integer,
                            constraints: vec![],
                        },
                        ColumnDef {
                            name: Ident::new("baz"),
                            data_type: DataType::Text,
                            constraints: vec![],
                        },
                    ],
                    constraints: vec![TableConstraint::PrimaryKey {
                        columns: vec![Ident::new("bar")],
                        conflict: None,
                    }],
                },
            }
        );
        Ok(())
    }

    #[test]
    fn parse_column_constraints() -> Result<(), ParserError> {
        let sql = "CREATE TABLE parts (\
                   part_id INTEGER PRIMARY KEY AUTOINCREMENT, \
                   stock INTEGER DEFAULT 0 NOT NULL, \
                   name TEXT)";
        let stmt = Parser::new_with_sql(sql)?.parse_create_table_stmt()?;
        let columns = match &stmt.content {
            TableContent::Columns { columns, .. } => columns,
            other => panic!("expected column defs, got {:?}", other),
        };
        assert_eq!(
            columns[0].constraints,
            vec![ColumnConstraint::PrimaryKey {
                asc: None,
                autoincrement: true,
                conflict: None,
            }]
        );
        assert_eq!(
            columns[1].constraints,
            vec![
                ColumnConstraint::Default(Box::new(Expr::Literal(Literal::Number("0".into())))),
                ColumnConstraint::NotNull { conflict: None },
            ]
        );
        assert!(columns[2].constraints.is_empty());
        Ok(())
    }

    #[test]
    fn parse_check_and_conflict_clause() -> Result<(), ParserError> {
        let sql = "CREATE TABLE t (id INT PRIMARY KEY ON CONFLICT REPLACE, v INT CHECK (v > 0))";
        let stmt = Parser::new_with_sql(sql)?.parse_create_table_stmt()?;
        let columns = match &stmt.content {
            TableContent::Columns { columns, .. } => columns,
            other => panic!("expected column defs, got {:?}", other),
        };
        assert_eq!(
            columns[0].constraints,
            vec![ColumnConstraint::PrimaryKey {
                asc: None,
                autoincrement: false,
                conflict: Some(ConflictAction::Replace),
            }]
        );
        assert!(matches!(
            columns[1].constraints[0],
            ColumnConstraint::Check(_)
        ));
        Ok(())
    }

    #[test]
    fn parse_create_table_as_select() -> Result<(), ParserError> {
        let stmt = Parser::new_with_sql("CREATE TABLE copy AS SELECT * FROM src")?
            .parse_create_table_stmt()?;
        assert!(matches!(stmt.content, TableContent::Query(_)));
        Ok(())
    }

    #[test]
    fn parse_alter_table_stmt() -> Result<(), ParserError> {
        assert_eq!(
            Parser::new_with_sql("ALTER TABLE foo RENAME TO bar")?.parse_alter_table_stmt()?,
            AlterTableStmt {
                name: Ident::new("foo"),
                action: AlterTableAction::RenameTo(Ident::new("bar")),
            }
        );
        assert_eq!(
            Parser::new_with_sql("ALTER TABLE foo ADD COLUMN bar INT")?
                .parse_alter_table_stmt()?,
            AlterTableStmt {
                name: Ident::new("foo"),
                action: AlterTableAction::AddColumn(ColumnDef {
                    name: Ident::new("bar"),
                    data_type: DataType::Integer,
                    constraints: vec![],
                }),
            }
        );
        Ok(())
    }

    #[test]
    fn parse_drop_stmt() -> Result<(), ParserError> {
        assert_eq!(
            Parser::new_with_sql("DROP TABLE IF EXISTS foo")?.parse_drop_stmt()?,
            DropStmt {
                ty: ObjectType::Table,
                if_exists: true,
                name: Ident::new("foo"),
            }
        );
        assert_eq!(
            Parser::new_with_sql("DROP VIEW v")?.parse_drop_stmt()?,
            DropStmt {
                ty: ObjectType::View,
                if_exists: false,
                name: Ident::new("v"),
            }
        );
        Ok(())
    }

    #[test]
    fn parse_create_index_stmt() -> Result<(), ParserError> {
        assert_eq!(
            Parser::new_with_sql("CREATE UNIQUE INDEX idx ON t (a, b)")?
                .parse_create_index_stmt()?,
            CreateIndexStmt {
                unique: true,
                if_not_exists: false,
                name: Ident::new("idx"),
                table: Ident::new("t"),
                columns: vec![Ident::new("a"), Ident::new("b")],
            }
        );
        Ok(())
    }

    #[test]
    fn parse_create_trigger_stmt() -> Result<(), ParserError> {
        let sql = "CREATE TRIGGER trg AFTER INSERT ON t BEGIN DELETE FROM t; END";
        let stmt = Parser::new_with_sql(sql)?.parse_create_trigger_stmt()?;
        assert_eq!(stmt.name, Ident::new("trg"));
        assert!(stmt.body.starts_with("AFTER INSERT ON t BEGIN"));
        assert!(stmt.body.ends_with("END"));
        Ok(())
    }
}
