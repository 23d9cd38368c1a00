use memdb_ast::{
    BeginStmt, CommitStmt, ReleaseStmt, RollbackStmt, SavepointStmt, TransactionMode,
};
use memdb_lexer::Keyword;

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Parses a `BEGIN` statement.
    ///
    /// ```txt
    /// BEGIN [ DEFERRED | IMMEDIATE | EXCLUSIVE ] [ TRANSACTION ]
    /// ```
    pub fn parse_begin_stmt(&mut self) -> Result<BeginStmt, ParserError> {
        self.expect_keyword(Keyword::BEGIN)?;
        let mode = match self.parse_one_of_keywords(&[
            Keyword::DEFERRED,
            Keyword::IMMEDIATE,
            Keyword::EXCLUSIVE,
        ]) {
            Some(Keyword::DEFERRED) => Some(TransactionMode::Deferred),
            Some(Keyword::IMMEDIATE) => Some(TransactionMode::Immediate),
            Some(Keyword::EXCLUSIVE) => Some(TransactionMode::Exclusive),
            _ => None,
        };
        self.parse_keyword(Keyword::TRANSACTION);
        Ok(BeginStmt { mode })
    }

    /// Parses a `COMMIT` / `END` statement.
    ///
    /// ```txt
    /// { COMMIT | END } [ TRANSACTION ]
    /// ```
    pub fn parse_commit_stmt(&mut self) -> Result<CommitStmt, ParserError> {
        let keyword = self.expect_one_of_keywords(&[Keyword::COMMIT, Keyword::END])?;
        self.parse_keyword(Keyword::TRANSACTION);
        Ok(CommitStmt {
            end: keyword == Keyword::END,
        })
    }

    /// Parses a `ROLLBACK` statement.
    ///
    /// ```txt
    /// ROLLBACK [ TRANSACTION ] [ TO [ SAVEPOINT ] <name> ]
    /// ```
    pub fn parse_rollback_stmt(&mut self) -> Result<RollbackStmt, ParserError> {
        self.expect_keyword(Keyword::ROLLBACK)?;
        self.parse_keyword(Keyword::TRANSACTION);
        let savepoint = if self.parse_keyword(Keyword::TO) {
            self.parse_keyword(Keyword::SAVEPOINT);
            Some(self.parse_identifier()?)
        } else {
            None
        };
        Ok(RollbackStmt { savepoint })
    }

    /// Parses a `SAVEPOINT <name>` statement.
    pub fn parse_savepoint_stmt(&mut self) -> Result<SavepointStmt, ParserError> {
        self.expect_keyword(Keyword::SAVEPOINT)?;
        Ok(SavepointStmt {
            name: self.parse_identifier()?,
        })
    }

    /// Parses a `RELEASE [ SAVEPOINT ] <name>` statement.
    pub fn parse_release_stmt(&mut self) -> Result<ReleaseStmt, ParserError> {
        self.expect_keyword(Keyword::RELEASE)?;
        self.parse_keyword(Keyword::SAVEPOINT);
        Ok(ReleaseStmt {
            name: self.parse_identifier()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_begin_stmt() -> Result<(), ParserError> {
        assert_eq!(
            Parser::new_with_sql("BEGIN")?.parse_begin_stmt()?,
            BeginStmt { mode: None }
        );
        assert_eq!(
            Parser::new_with_sql("BEGIN IMMEDIATE TRANSACTION")?.parse_begin_stmt()?,
            BeginStmt {
                mode: Some(TransactionMode::Immediate)
            }
        );
        Ok(())
    }

    #[test]
    fn parse_commit_stmt() -> Result<(), ParserError> {
        assert_eq!(
            Parser::new_with_sql("COMMIT TRANSACTION")?.parse_commit_stmt()?,
            CommitStmt { end: false }
        );
        assert_eq!(
            Parser::new_with_sql("END")?.parse_commit_stmt()?,
            CommitStmt { end: true }
        );
        Ok(())
    }

    #[test]
    fn parse_rollback_stmt() -> Result<(), ParserError> {
        assert_eq!(
            Parser::new_with_sql("ROLLBACK")?.parse_rollback_stmt()?,
            RollbackStmt { savepoint: None }
        );
        assert_eq!(
            Parser::new_with_sql("ROLLBACK TO SAVEPOINT sp")?.parse_rollback_stmt()?,
            RollbackStmt {
                savepoint: Some("sp".into())
            }
        );
        Ok(())
    }
}
