use log::debug;
use memdb_ast::{
    AlterTableAction, AlterTableStmt, CreateTableStmt, DataType, DropStmt, ObjectType,
    TableContent,
};

use crate::{
    error::{Error, Result},
    eval::EvalContext,
    record::Record,
    schema::{column_schema, ColumnSchema, TableSchema},
    store::Database,
    table::TableStore,
    value::Value,
};

impl Database {
    /// `CREATE TABLE`: from a column list, or from a source query with the
    /// schema derived from the first result row (every column untyped).
    pub(crate) fn create_table(&mut self, stmt: &CreateTableStmt) -> Result<()> {
        let name = stmt.name.value.clone();
        if self.has_table(&name) {
            return if stmt.if_not_exists {
                Ok(())
            } else {
                Err(Error::DuplicateTable(name))
            };
        }
        let table = match &stmt.content {
            TableContent::Columns {
                columns,
                constraints,
            } => TableStore::new(TableSchema::from_definition(&name, columns, constraints)?),
            TableContent::Query(query) => {
                let rows = self.execute_query(query)?;
                let columns = rows
                    .first()
                    .map(|row| {
                        row.keys()
                            .enumerate()
                            .map(|(id, key)| ColumnSchema::plain(id, key.clone(), DataType::None))
                            .collect()
                    })
                    .unwrap_or_default();
                let mut table = TableStore::new(TableSchema {
                    name: name.clone(),
                    columns,
                    checks: vec![],
                });
                table.rows = rows;
                table
            }
        };
        debug!("created table {}", name);
        self.tables.insert(name, table);
        Ok(())
    }

    /// `ALTER TABLE`: rename, or append a column.
    pub(crate) fn alter_table(&mut self, stmt: &AlterTableStmt) -> Result<()> {
        let name = stmt.name.value.clone();
        match &stmt.action {
            AlterTableAction::RenameTo(new_name) => {
                let new_name = new_name.value.clone();
                if self.has_table(&new_name) {
                    return Err(Error::DuplicateTable(new_name));
                }
                let mut table = self
                    .tables
                    .shift_remove(&name)
                    .ok_or(Error::UnknownTable(name))?;
                table.schema.name = new_name.clone();
                self.tables.insert(new_name, table);
            }
            AlterTableAction::AddColumn(def) => {
                let id = self.table(&name)?.schema.columns.len();
                let column = column_schema(id, def)?;
                if column.is_primary_key || column.is_unique {
                    return Err(Error::UnsupportedCommand(
                        "ADD COLUMN cannot add PRIMARY KEY or UNIQUE constraints".into(),
                    ));
                }
                // existing rows get the default, or NULL
                let fill = match &column.default {
                    Some(expr) => EvalContext::new(0).eval(expr, &Record::new())?,
                    None => Value::Null,
                };
                let table = self.table_mut(&name)?;
                for row in &mut table.rows {
                    row.insert(column.name.clone(), fill.clone());
                }
                table.schema.columns.push(column);
            }
        }
        Ok(())
    }

    /// `DROP TABLE`; other object kinds are unsupported.
    pub(crate) fn drop_object(&mut self, stmt: &DropStmt) -> Result<()> {
        match stmt.ty {
            ObjectType::Table => {
                let name = stmt.name.value.clone();
                if self.tables.shift_remove(&name).is_none() && !stmt.if_exists {
                    return Err(Error::UnknownTable(name));
                }
                Ok(())
            }
            other => Err(Error::UnsupportedCommand(format!(
                "DROP {} is not supported",
                other
            ))),
        }
    }
}
