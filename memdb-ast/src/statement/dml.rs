use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    expression::{Expr, Query, Where},
    statement::ConflictAction,
    types::Ident,
    utils::display_comma_separated,
};

/// The `INSERT INTO ...` statement.
///
/// ```txt
/// INSERT [ OR <conflict action> ] INTO <table name> [ ( <column> [, ...] ) ]
///     { VALUES ( <expr> [, ...] ) [, ...] | <query expression> | DEFAULT VALUES }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InsertStmt {
    /// The `OR <action>` conflict policy, if any.
    pub action: Option<ConflictAction>,
    /// Table name.
    pub table: Ident,
    /// Destination column list; empty means "all columns in schema order".
    pub columns: Vec<Ident>,
    /// What to insert.
    pub source: InsertSource,
}

impl fmt::Display for InsertStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("INSERT ")?;
        if let Some(action) = &self.action {
            write!(f, "OR {} ", action)?;
        }
        write!(f, "INTO {}", self.table)?;
        if !self.columns.is_empty() {
            write!(f, " ({})", display_comma_separated(&self.columns))?;
        }
        write!(f, " {}", self.source)
    }
}

/// The source of an `INSERT` statement.
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InsertSource {
    /// `VALUES (a, b), (c, d), ...`
    Values(Vec<Vec<Expr>>),
    /// `INSERT INTO t SELECT ...`
    Query(Box<Query>),
    /// `DEFAULT VALUES`
    DefaultValues,
}

impl fmt::Display for InsertSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values(rows) => {
                f.write_str("VALUES ")?;
                let mut delim = "";
                for row in rows {
                    write!(f, "{}({})", delim, display_comma_separated(row))?;
                    delim = ", ";
                }
                Ok(())
            }
            Self::Query(query) => write!(f, "{}", query),
            Self::DefaultValues => f.write_str("DEFAULT VALUES"),
        }
    }
}

/// The `UPDATE ... SET ...` statement.
///
/// ```txt
/// UPDATE [ OR <conflict action> ] <table> SET <assignment> [, ...]
///     [ WHERE <search condition> ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UpdateStmt {
    /// The `OR <action>` conflict policy, if any.
    pub action: Option<ConflictAction>,
    /// Table name.
    pub table: Ident,
    /// Column assignments.
    pub assignments: Vec<Assignment>,
    /// Search condition.
    pub selection: Option<Where>,
}

impl fmt::Display for UpdateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UPDATE ")?;
        if let Some(action) = &self.action {
            write!(f, "OR {} ", action)?;
        }
        write!(
            f,
            "{} SET {}",
            self.table,
            display_comma_separated(&self.assignments)
        )?;
        if let Some(selection) = &self.selection {
            write!(f, " {}", selection)?;
        }
        Ok(())
    }
}

/// SQL assignment `foo = expr` as used in the `UPDATE` statement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    /// Set target.
    pub target: Ident,
    /// Update source.
    pub value: Expr,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.target, self.value)
    }
}

/// The `DELETE FROM ...` statement.
///
/// ```txt
/// DELETE FROM <table> [ WHERE <search condition> ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeleteStmt {
    /// Table name.
    pub table: Ident,
    /// Search condition.
    pub selection: Option<Where>,
}

impl fmt::Display for DeleteStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(selection) = &self.selection {
            write!(f, " {}", selection)?;
        }
        Ok(())
    }
}

/// The `SELECT ...` statement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectStmt(pub Box<Query>);

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
