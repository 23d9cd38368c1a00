use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    expression::{Expr, Query},
    statement::ConflictAction,
    types::{DataType, Ident, ObjectType},
    utils::display_comma_separated,
};

/// The `CREATE TABLE ...` statement.
///
/// ```txt
/// CREATE TABLE [ IF NOT EXISTS ] <table name>
///     ( <column definition> [, ...] [, <table constraint> [, ...] ] )
///     | AS <query expression>
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreateTableStmt {
    /// Suppress the duplicate-table error.
    pub if_not_exists: bool,
    /// Table name.
    pub name: Ident,
    /// Column definitions or the source query.
    pub content: TableContent,
}

impl fmt::Display for CreateTableStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}{}", self.name, self.content)
    }
}

/// The content of a table definition.
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TableContent {
    /// `( <column definition> [, ...] [, <table constraint> [, ...] ] )`
    Columns {
        columns: Vec<ColumnDef>,
        constraints: Vec<TableConstraint>,
    },
    /// `AS <query expression>`
    Query(Box<Query>),
}

impl fmt::Display for TableContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Columns {
                columns,
                constraints,
            } => {
                write!(f, " ({}", display_comma_separated(columns))?;
                if !constraints.is_empty() {
                    write!(f, ", {}", display_comma_separated(constraints))?;
                }
                f.write_str(")")
            }
            Self::Query(query) => write!(f, " AS {}", query),
        }
    }
}

/// A column definition.
///
/// ```txt
/// <column definition> ::= <column name> <data type> [ <column constraint> ... ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnDef {
    /// Column name.
    pub name: Ident,
    /// Column type.
    pub data_type: DataType,
    /// Column constraints, in source order.
    pub constraints: Vec<ColumnConstraint>,
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        for constraint in &self.constraints {
            write!(f, " {}", constraint)?;
        }
        Ok(())
    }
}

/// A constraint attached to a single column.
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
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColumnConstraint {
    PrimaryKey {
        asc: Option<bool>,
        autoincrement: bool,
        conflict: Option<ConflictAction>,
    },
    NotNull {
        conflict: Option<ConflictAction>,
    },
    Unique {
        conflict: Option<ConflictAction>,
    },
    Check(Box<Expr>),
    Default(Box<Expr>),
    Collate(Ident),
    References {
        table: Ident,
        columns: Vec<Ident>,
    },
}

impl fmt::Display for ColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey {
                asc,
                autoincrement,
                conflict,
            } => {
                f.write_str("PRIMARY KEY")?;
                match asc {
                    Some(true) => f.write_str(" ASC")?,
                    Some(false) => f.write_str(" DESC")?,
                    None => (),
                }
                if let Some(action) = conflict {
                    write!(f, " ON CONFLICT {}", action)?;
                }
                if *autoincrement {
                    f.write_str(" AUTOINCREMENT")?;
                }
                Ok(())
            }
            Self::NotNull { conflict } => {
                f.write_str("NOT NULL")?;
                if let Some(action) = conflict {
                    write!(f, " ON CONFLICT {}", action)?;
                }
                Ok(())
            }
            Self::Unique { conflict } => {
                f.write_str("UNIQUE")?;
                if let Some(action) = conflict {
                    write!(f, " ON CONFLICT {}", action)?;
                }
                Ok(())
            }
            Self::Check(expr) => write!(f, "CHECK ({})", expr),
            Self::Default(expr) => write!(f, "DEFAULT {}", expr),
            Self::Collate(name) => write!(f, "COLLATE {}", name),
            Self::References { table, columns } => {
                write!(f, "REFERENCES {}", table)?;
                if !columns.is_empty() {
                    write!(f, " ({})", display_comma_separated(columns))?;
                }
                Ok(())
            }
        }
    }
}

/// A table-level constraint.
///
/// ```txt
/// <table constraint> ::=
///     PRIMARY KEY ( <column> [, ...] ) [ <conflict clause> ]
///     | UNIQUE ( <column> [, ...] ) [ <conflict clause> ]
///     | CHECK ( <search condition> )
///     | FOREIGN KEY ( <column> [, ...] ) REFERENCES <table> [ ( <column> [, ...] ) ]
/// ```
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TableConstraint {
    PrimaryKey {
        columns: Vec<Ident>,
        conflict: Option<ConflictAction>,
    },
    Unique {
        columns: Vec<Ident>,
        conflict: Option<ConflictAction>,
    },
    Check(Box<Expr>),
    ForeignKey {
        columns: Vec<Ident>,
        table: Ident,
        referenced_columns: Vec<Ident>,
    },
}

impl fmt::Display for TableConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey { columns, conflict } => {
                write!(f, "PRIMARY KEY ({})", display_comma_separated(columns))?;
                if let Some(action) = conflict {
                    write!(f, " ON CONFLICT {}", action)?;
                }
                Ok(())
            }
            Self::Unique { columns, conflict } => {
                write!(f, "UNIQUE ({})", display_comma_separated(columns))?;
                if let Some(action) = conflict {
                    write!(f, " ON CONFLICT {}", action)?;
                }
                Ok(())
            }
            Self::Check(expr) => write!(f, "CHECK ({})", expr),
            Self::ForeignKey {
                columns,
                table,
                referenced_columns,
            } => {
                write!(
                    f,
                    "FOREIGN KEY ({}) REFERENCES {}",
                    display_comma_separated(columns),
                    table
                )?;
                if !referenced_columns.is_empty() {
                    write!(f, " ({})", display_comma_separated(referenced_columns))?;
                }
                Ok(())
            }
        }
    }
}

/// The `ALTER TABLE ...` statement.
///
/// ```txt
/// ALTER TABLE <table name> { RENAME TO <new name> | ADD [ COLUMN ] <column definition> }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlterTableStmt {
    /// Table name.
    pub name: Ident,
    /// What to change.
    pub action: AlterTableAction,
}

impl fmt::Display for AlterTableStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {} {}", self.name, self.action)
    }
}

/// An alter table action.
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlterTableAction {
    RenameTo(Ident),
    AddColumn(ColumnDef),
}

impl fmt::Display for AlterTableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RenameTo(name) => write!(f, "RENAME TO {}", name),
            Self::AddColumn(column) => write!(f, "ADD COLUMN {}", column),
        }
    }
}

/// The `DROP { TABLE | INDEX | TRIGGER | VIEW } ...` statement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DropStmt {
    /// What kind of object is dropped.
    pub ty: ObjectType,
    /// Suppress the unknown-object error.
    pub if_exists: bool,
    /// Object name.
    pub name: Ident,
}

impl fmt::Display for DropStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP {} ", self.ty)?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        write!(f, "{}", self.name)
    }
}

/// The `CREATE INDEX ...` statement. Parsed for completeness; execution
/// rejects it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreateIndexStmt {
    /// `CREATE UNIQUE INDEX`.
    pub unique: bool,
    /// Suppress the duplicate error.
    pub if_not_exists: bool,
    /// Index name.
    pub name: Ident,
    /// Indexed table.
    pub table: Ident,
    /// Indexed columns.
    pub columns: Vec<Ident>,
}

impl fmt::Display for CreateIndexStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.unique {
            write!(f, "UNIQUE ")?;
        }
        write!(f, "INDEX ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(
            f,
            "{} ON {} ({})",
            self.name,
            self.table,
            display_comma_separated(&self.columns)
        )
    }
}

/// The `CREATE VIEW ...` statement. Parsed for completeness; execution
/// rejects it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreateViewStmt {
    /// Suppress the duplicate error.
    pub if_not_exists: bool,
    /// View name.
    pub name: Ident,
    /// The view body.
    pub query: Box<Query>,
}

impl fmt::Display for CreateViewStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE VIEW ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{} AS {}", self.name, self.query)
    }
}

/// The `CREATE TRIGGER ...` statement. The body is kept as raw token text;
/// execution rejects the statement, so nothing interprets it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreateTriggerStmt {
    /// Suppress the duplicate error.
    pub if_not_exists: bool,
    /// Trigger name.
    pub name: Ident,
    /// Everything after the name, re-rendered token by token.
    pub body: String,
}

impl fmt::Display for CreateTriggerStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TRIGGER ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", self.name)?;
        if !self.body.is_empty() {
            write!(f, " {}", self.body)?;
        }
        Ok(())
    }
}
