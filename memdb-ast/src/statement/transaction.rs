use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::Ident;

/// The `BEGIN [ DEFERRED | IMMEDIATE | EXCLUSIVE ] [ TRANSACTION ]` statement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeginStmt {
    /// The declared locking mode; accepted but has no effect in memory.
    pub mode: Option<TransactionMode>,
}

impl fmt::Display for BeginStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BEGIN")?;
        if let Some(mode) = &self.mode {
            write!(f, " {}", mode)?;
        }
        Ok(())
    }
}

/// The transaction locking mode.
#[doc(hidden)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransactionMode {
    Deferred,
    Immediate,
    Exclusive,
}

impl fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionMode::Deferred => "DEFERRED",
            TransactionMode::Immediate => "IMMEDIATE",
            TransactionMode::Exclusive => "EXCLUSIVE",
        })
    }
}

/// The `COMMIT [ TRANSACTION ]` statement; `END` is an accepted alias.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommitStmt {
    /// True when spelled `END`.
    pub end: bool,
}

impl fmt::Display for CommitStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.end { "END" } else { "COMMIT" })
    }
}

/// The `ROLLBACK [ TRANSACTION ] [ TO SAVEPOINT <name> ]` statement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RollbackStmt {
    /// The savepoint to roll back to, if any. Named savepoints are rejected
    /// at execution.
    pub savepoint: Option<Ident>,
}

impl fmt::Display for RollbackStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ROLLBACK")?;
        if let Some(name) = &self.savepoint {
            write!(f, " TO SAVEPOINT {}", name)?;
        }
        Ok(())
    }
}

/// The `SAVEPOINT <name>` statement. Rejected at execution.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SavepointStmt {
    /// Savepoint name.
    pub name: Ident,
}

impl fmt::Display for SavepointStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SAVEPOINT {}", self.name)
    }
}

/// The `RELEASE [ SAVEPOINT ] <name>` statement. Rejected at execution.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReleaseStmt {
    /// Savepoint name.
    pub name: Ident,
}

impl fmt::Display for ReleaseStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RELEASE SAVEPOINT {}", self.name)
    }
}
