use memdb_ast::{
    ColumnConstraint, ColumnDef, ConflictAction, DataType, Expr, TableConstraint,
};

use crate::error::{Error, Result};

/// The schema of one column.
#[derive(Clone, Debug)]
pub struct ColumnSchema {
    /// Position of the column in the table, 0-based.
    pub id: usize,
    /// Column name; case-sensitive.
    pub name: String,
    /// Declared type; [`DataType::None`] for untyped columns.
    pub data_type: DataType,
    /// False when the column is declared NOT NULL.
    pub allows_null: bool,
    /// The DEFAULT expression, evaluated against an empty row.
    pub default: Option<Expr>,
    /// Whether this is the table's primary-key column.
    pub is_primary_key: bool,
    /// Whether values must be unique across rows.
    pub is_unique: bool,
    /// Whether the primary key assigns itself increasing integers.
    pub autoincrement: bool,
    /// The CHECK expression, evaluated against every candidate row.
    pub check: Option<Expr>,
    /// The conflict policy declared with the constraint, if any.
    pub conflict: Option<ConflictAction>,
}

impl ColumnSchema {
    /// A plain nullable column with no constraints.
    pub fn plain(id: usize, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id,
            name: name.into(),
            data_type,
            allows_null: true,
            default: None,
            is_primary_key: false,
            is_unique: false,
            autoincrement: false,
            check: None,
            conflict: None,
        }
    }
}

/// The schema of one table.
#[derive(Clone, Debug)]
pub struct TableSchema {
    /// Table name; case-sensitive.
    pub name: String,
    /// Columns, in definition order.
    pub columns: Vec<ColumnSchema>,
    /// Table-level CHECK expressions.
    pub checks: Vec<Expr>,
}

impl TableSchema {
    /// Builds a schema from a parsed table definition.
    ///
    /// `COLLATE` and `REFERENCES` constraints (including `FOREIGN KEY`) are
    /// not supported and rejected here; so is a composite primary key, since
    /// a table has at most one primary-key column.
    pub fn from_definition(
        name: impl Into<String>,
        columns: &[ColumnDef],
        constraints: &[TableConstraint],
    ) -> Result<Self> {
        let name = name.into();
        let mut schema = TableSchema {
            name,
            columns: Vec::with_capacity(columns.len()),
            checks: vec![],
        };
        for (id, def) in columns.iter().enumerate() {
            schema.columns.push(column_schema(id, def)?);
        }
        for constraint in constraints {
            schema.apply_table_constraint(constraint)?;
        }
        if schema.columns.iter().filter(|c| c.is_primary_key).count() > 1 {
            return Err(Error::UnsupportedCommand(
                "a table can have at most one primary-key column".into(),
            ));
        }
        Ok(schema)
    }

    fn apply_table_constraint(&mut self, constraint: &TableConstraint) -> Result<()> {
        match constraint {
            TableConstraint::PrimaryKey { columns, conflict } => {
                if columns.len() > 1 {
                    return Err(Error::UnsupportedCommand(
                        "composite primary keys are not supported".into(),
                    ));
                }
                let column = self.column_mut_checked(&columns[0].value)?;
                column.is_primary_key = true;
                column.is_unique = true;
                column.conflict = column.conflict.or(*conflict);
            }
            TableConstraint::Unique { columns, conflict } => {
                for ident in columns {
                    let column = self.column_mut_checked(&ident.value)?;
                    column.is_unique = true;
                    column.conflict = column.conflict.or(*conflict);
                }
            }
            TableConstraint::Check(expr) => self.checks.push((**expr).clone()),
            TableConstraint::ForeignKey { .. } => {
                return Err(Error::UnsupportedCommand(
                    "FOREIGN KEY constraints are not supported".into(),
                ));
            }
        }
        Ok(())
    }

    /// The primary-key column, when the table has one.
    pub fn primary_key_column(&self) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn column_mut_checked(&mut self, name: &str) -> Result<&mut ColumnSchema> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }
}

/// Builds the schema of a single column from its definition.
pub(crate) fn column_schema(id: usize, def: &ColumnDef) -> Result<ColumnSchema> {
    let mut column = ColumnSchema::plain(id, def.name.value.clone(), def.data_type);
    for constraint in &def.constraints {
        match constraint {
            ColumnConstraint::PrimaryKey {
                autoincrement,
                conflict,
                ..
            } => {
                column.is_primary_key = true;
                column.is_unique = true;
                column.autoincrement = *autoincrement;
                column.conflict = column.conflict.or(*conflict);
            }
            ColumnConstraint::NotNull { conflict } => {
                column.allows_null = false;
                column.conflict = column.conflict.or(*conflict);
            }
            ColumnConstraint::Unique { conflict } => {
                column.is_unique = true;
                column.conflict = column.conflict.or(*conflict);
            }
            ColumnConstraint::Check(expr) => column.check = Some((**expr).clone()),
            ColumnConstraint::Default(expr) => column.default = Some((**expr).clone()),
            ColumnConstraint::Collate(_) => {
                return Err(Error::UnsupportedCommand(
                    "COLLATE constraints are not supported".into(),
                ));
            }
            ColumnConstraint::References { .. } => {
                return Err(Error::UnsupportedCommand(
                    "REFERENCES constraints are not supported".into(),
                ));
            }
        }
    }
    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdb_parser::Parser;

    fn schema_of(sql: &str) -> Result<TableSchema> {
        let stmt = Parser::new_with_sql(sql)
            .unwrap()
            .parse_create_table_stmt()
            .unwrap();
        match &stmt.content {
            memdb_ast::TableContent::Columns {
                columns,
                constraints,
            } => TableSchema::from_definition(stmt.name.value, columns, constraints),
            other => panic!("expected columns, got {:?}", other),
        }
    }

    #[test]
    fn schema_from_definition() {
        let schema = schema_of(
            "CREATE TABLE parts (\
             part_id INTEGER PRIMARY KEY AUTOINCREMENT, \
             stock INTEGER DEFAULT 0 NOT NULL, \
             name TEXT)",
        )
        .unwrap();
        assert_eq!(schema.columns.len(), 3);
        let pk = schema.primary_key_column().unwrap();
        assert_eq!(pk.name, "part_id");
        assert!(pk.autoincrement && pk.is_unique);
        let stock = schema.column("stock").unwrap();
        assert!(!stock.allows_null);
        assert!(stock.default.is_some());
        assert!(schema.column("name").unwrap().allows_null);
    }

    #[test]
    fn table_level_primary_key() {
        let schema = schema_of("CREATE TABLE t (a INT, b INT, PRIMARY KEY (a))").unwrap();
        assert_eq!(schema.primary_key_column().unwrap().name, "a");
    }

    #[test]
    fn unsupported_constraints_are_rejected() {
        assert!(matches!(
            schema_of("CREATE TABLE t (a INT COLLATE nocase)"),
            Err(Error::UnsupportedCommand(_))
        ));
        assert!(matches!(
            schema_of("CREATE TABLE t (a INT REFERENCES other (id))"),
            Err(Error::UnsupportedCommand(_))
        ));
        assert!(matches!(
            schema_of("CREATE TABLE t (a INT, b INT, PRIMARY KEY (a, b))"),
            Err(Error::UnsupportedCommand(_))
        ));
    }
}
