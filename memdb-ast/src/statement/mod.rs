mod ddl;
mod dml;
mod transaction;

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::{ddl::*, dml::*, transaction::*};

/// A top-level statement (SELECT, INSERT, CREATE, etc.)
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stmt {
    // ========================================================================
    // Data definition
    // ========================================================================
    /// The `CREATE TABLE ...` statement
    CreateTable(CreateTableStmt),
    /// The `ALTER TABLE ...` statement
    AlterTable(AlterTableStmt),
    /// The `DROP { TABLE | INDEX | TRIGGER | VIEW } ...` statement
    Drop(DropStmt),

    /// The `CREATE INDEX ...` statement (parsed, rejected at execution)
    CreateIndex(CreateIndexStmt),
    /// The `CREATE VIEW ...` statement (parsed, rejected at execution)
    CreateView(CreateViewStmt),
    /// The `CREATE TRIGGER ...` statement (parsed, rejected at execution)
    CreateTrigger(CreateTriggerStmt),

    // ========================================================================
    // Data manipulation
    // ========================================================================
    /// The `INSERT INTO ...` statement
    Insert(InsertStmt),
    /// The `UPDATE ... SET ...` statement
    Update(UpdateStmt),
    /// The `DELETE FROM ...` statement
    Delete(DeleteStmt),
    /// The `SELECT ...` statement
    Select(SelectStmt),

    // ========================================================================
    // Transaction management
    // ========================================================================
    /// The `BEGIN ...` statement
    Begin(BeginStmt),
    /// The `COMMIT` / `END` statement
    Commit(CommitStmt),
    /// The `ROLLBACK ...` statement
    Rollback(RollbackStmt),
    /// The `SAVEPOINT <name>` statement
    Savepoint(SavepointStmt),
    /// The `RELEASE [SAVEPOINT] <name>` statement
    Release(ReleaseStmt),
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable(stmt) => write!(f, "{}", stmt),
            Self::AlterTable(stmt) => write!(f, "{}", stmt),
            Self::Drop(stmt) => write!(f, "{}", stmt),
            Self::CreateIndex(stmt) => write!(f, "{}", stmt),
            Self::CreateView(stmt) => write!(f, "{}", stmt),
            Self::CreateTrigger(stmt) => write!(f, "{}", stmt),

            Self::Insert(stmt) => write!(f, "{}", stmt),
            Self::Update(stmt) => write!(f, "{}", stmt),
            Self::Delete(stmt) => write!(f, "{}", stmt),
            Self::Select(stmt) => write!(f, "{}", stmt),

            Self::Begin(stmt) => write!(f, "{}", stmt),
            Self::Commit(stmt) => write!(f, "{}", stmt),
            Self::Rollback(stmt) => write!(f, "{}", stmt),
            Self::Savepoint(stmt) => write!(f, "{}", stmt),
            Self::Release(stmt) => write!(f, "{}", stmt),
        }
    }
}

/// The policy applied when a constraint violation occurs.
///
/// Appears in `INSERT OR <action>`, `UPDATE OR <action>` and the
/// `ON CONFLICT <action>` clause of column and table constraints.
#[doc(hidden)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConflictAction {
    Rollback,
    Abort,
    Fail,
    Ignore,
    Replace,
}

impl fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ConflictAction::Rollback => "ROLLBACK",
            ConflictAction::Abort => "ABORT",
            ConflictAction::Fail => "FAIL",
            ConflictAction::Ignore => "IGNORE",
            ConflictAction::Replace => "REPLACE",
        })
    }
}
