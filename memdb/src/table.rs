use log::trace;
use memdb_ast::{ConflictAction, Expr};

use crate::{
    error::{Error, Result},
    eval::EvalContext,
    record::{Record, RecordSet},
    schema::TableSchema,
    value::Value,
};

/// One table held in memory: its schema plus its rows, in insertion order.
#[derive(Clone, Debug)]
pub struct TableStore {
    /// The table schema.
    pub schema: TableSchema,
    /// The rows, in insertion order.
    pub rows: RecordSet,
}

impl TableStore {
    /// Creates an empty table with the given schema.
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: vec![],
        }
    }

    /// The primary-key value of the last row, if any.
    pub fn last_primary_key_value(&self) -> Option<&Value> {
        let pk = self.schema.primary_key_column()?;
        self.rows.last().and_then(|row| row.get(&pk.name))
    }

    /// One more than the largest integer primary key, when the key
    /// auto-increments; zero otherwise.
    pub fn next_auto_increment_id(&self) -> i64 {
        match self.schema.primary_key_column() {
            Some(pk) if pk.autoincrement => {
                let largest = self
                    .rows
                    .iter()
                    .filter_map(|row| match row.get(&pk.name) {
                        Some(Value::Integer(v)) => Some(*v),
                        _ => None,
                    })
                    .max()
                    .unwrap_or(0);
                largest + 1
            }
            _ => 0,
        }
    }

    /// Whether a row with the given primary-key value exists.
    pub fn has_row(&self, pk_value: &Value) -> bool {
        let pk = match self.schema.primary_key_column() {
            Some(pk) => pk.name.clone(),
            None => return false,
        };
        self.rows
            .iter()
            .any(|row| row.get(&pk) == Some(pk_value))
    }

    /// Inserts a record, enforcing the schema.
    ///
    /// The record must name exactly the schema's columns. An auto-increment
    /// primary key left NULL is assigned here. On a uniqueness conflict the
    /// effective action decides: REPLACE updates the existing row, ROLLBACK,
    /// ABORT and IGNORE silently skip the insert, anything else is a
    /// duplicate-record error.
    pub fn insert_row(&mut self, mut record: Record, action: Option<ConflictAction>) -> Result<()> {
        // assign the auto-incrementing key before validation
        if let Some(pk) = self.schema.primary_key_column() {
            if pk.autoincrement
                && record
                    .get(&pk.name)
                    .map(Value::is_null)
                    .unwrap_or(true)
            {
                let id = self.next_auto_increment_id();
                record.insert(pk.name.clone(), Value::Integer(id));
            }
        }

        for column in record.keys() {
            if self.schema.column(column).is_none() {
                return Err(Error::UnknownColumn(format!(
                    "{} has no column named {}",
                    self.schema.name, column
                )));
            }
        }
        if record.len() != self.schema.columns.len() {
            return Err(Error::InvalidRecord(format!(
                "{} expects {} columns, record has {}",
                self.schema.name,
                self.schema.columns.len(),
                record.len()
            )));
        }

        self.validate_record(&record)?;

        // uniqueness
        for column in self.schema.columns.iter().filter(|c| c.is_unique) {
            let value = record.get(&column.name).cloned().unwrap_or(Value::Null);
            if value.is_null() {
                continue;
            }
            let existing = self
                .rows
                .iter()
                .position(|row| row.get(&column.name) == Some(&value));
            if let Some(existing) = existing {
                let action = action.or(column.conflict);
                trace!(
                    "unique conflict on {}.{}, action {:?}",
                    self.schema.name,
                    column.name,
                    action
                );
                return match action {
                    Some(ConflictAction::Replace) => {
                        self.rows[existing] = record;
                        Ok(())
                    }
                    Some(ConflictAction::Rollback)
                    | Some(ConflictAction::Abort)
                    | Some(ConflictAction::Ignore) => Ok(()),
                    _ => Err(Error::DuplicateRecord(format!(
                        "duplicate value in unique column {}.{}",
                        self.schema.name, column.name
                    ))),
                };
            }
        }

        self.rows.push(record);
        Ok(())
    }

    /// Runs NOT NULL and every CHECK expression against a candidate record.
    pub fn validate_record(&self, record: &Record) -> Result<()> {
        for column in &self.schema.columns {
            let value = record.get(&column.name).unwrap_or(&Value::Null);
            if !column.allows_null && value.is_null() {
                return Err(Error::InvalidRecord(format!(
                    "column {}.{} is NOT NULL",
                    self.schema.name, column.name
                )));
            }
            if let Some(check) = &column.check {
                self.run_check(check, record, &column.name)?;
            }
        }
        for check in &self.schema.checks {
            self.run_check(check, record, "<table>")?;
        }
        Ok(())
    }

    fn run_check(&self, check: &Expr, record: &Record, column: &str) -> Result<()> {
        let mut ctx = EvalContext::new(0);
        match ctx.eval(check, record)? {
            Value::Bool(true) => Ok(()),
            Value::Bool(false) => Err(Error::FailedCheckConstraint(format!(
                "check failed for {}.{}",
                self.schema.name, column
            ))),
            other => Err(Error::Syntax(format!(
                "check expression must be boolean, got {}",
                other.type_name()
            ))),
        }
    }

    /// Indexes of the rows equal to `matching` on every listed column, in row
    /// order.
    pub fn find_rows(&self, matching: &Record, on_columns: &[String]) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                on_columns
                    .iter()
                    .all(|column| row.get(column) == matching.get(column))
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// The first row equal to `matching` on every listed column.
    pub fn find_row(&self, matching: &Record, on_columns: &[String]) -> Option<usize> {
        self.find_rows(matching, on_columns).into_iter().next()
    }

    /// The first row for which the expression is true.
    pub fn find_row_by_expr(
        &self,
        ctx: &mut EvalContext,
        expr: &Expr,
        alias: &str,
    ) -> Result<Option<usize>> {
        Ok(self.find_rows_by_expr(ctx, expr, alias)?.into_iter().next())
    }

    /// Indexes of the rows for which the expression is true. Each row is
    /// tested with every column also exposed under `alias.column`. The
    /// expression must evaluate to a boolean.
    pub fn find_rows_by_expr(
        &self,
        ctx: &mut EvalContext,
        expr: &Expr,
        alias: &str,
    ) -> Result<Vec<usize>> {
        let mut found = vec![];
        for (idx, row) in self.rows.iter().enumerate() {
            let test = self.qualified_record(row, alias);
            if ctx.eval_bool(expr, &test)? {
                found.push(idx);
            }
        }
        Ok(found)
    }

    /// A copy of the row with every column duplicated under `alias.column`.
    pub(crate) fn qualified_record(&self, row: &Record, alias: &str) -> Record {
        let mut record = row.clone();
        for (key, value) in row {
            record.insert(format!("{}.{}", alias, key), value.clone());
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdb_ast::DataType;
    use memdb_parser::Parser;

    fn parts_table() -> TableStore {
        let stmt = Parser::new_with_sql(
            "CREATE TABLE parts (\
             part_id INTEGER PRIMARY KEY AUTOINCREMENT, \
             stock INTEGER DEFAULT 0 NOT NULL, \
             name TEXT)",
        )
        .unwrap()
        .parse_create_table_stmt()
        .unwrap();
        let (columns, constraints) = match &stmt.content {
            memdb_ast::TableContent::Columns {
                columns,
                constraints,
            } => (columns, constraints),
            other => panic!("expected columns, got {:?}", other),
        };
        TableStore::new(TableSchema::from_definition("parts", columns, constraints).unwrap())
    }

    fn part(pk: Value, stock: i64, name: &str) -> Record {
        Record::from([
            ("part_id".to_string(), pk),
            ("stock".to_string(), Value::Integer(stock)),
            ("name".to_string(), Value::Text(name.into())),
        ])
    }

    #[test]
    fn auto_increment_assigns_increasing_ids() {
        let mut table = parts_table();
        table.insert_row(part(Value::Null, 0, "bolt"), None).unwrap();
        table.insert_row(part(Value::Null, 0, "nut"), None).unwrap();
        assert_eq!(table.rows[0]["part_id"], Value::Integer(1));
        assert_eq!(table.rows[1]["part_id"], Value::Integer(2));
        assert_eq!(table.next_auto_increment_id(), 3);
        assert_eq!(table.last_primary_key_value(), Some(&Value::Integer(2)));
        assert!(table.has_row(&Value::Integer(1)));
        assert!(!table.has_row(&Value::Integer(9)));
    }

    #[test]
    fn duplicate_key_dispatches_on_action() {
        let mut table = parts_table();
        table
            .insert_row(part(Value::Integer(1), 0, "bolt"), None)
            .unwrap();
        // default: error
        assert!(matches!(
            table.insert_row(part(Value::Integer(1), 5, "nut"), None),
            Err(Error::DuplicateRecord(_))
        ));
        // ignore: silently skipped
        table
            .insert_row(
                part(Value::Integer(1), 5, "nut"),
                Some(ConflictAction::Ignore),
            )
            .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["name"], Value::Text("bolt".into()));
        // replace: existing row updated
        table
            .insert_row(
                part(Value::Integer(1), 5, "nut"),
                Some(ConflictAction::Replace),
            )
            .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["name"], Value::Text("nut".into()));
    }

    #[test]
    fn not_null_and_unknown_column() {
        let mut table = parts_table();
        let mut bad = part(Value::Null, 0, "bolt");
        bad.insert("stock".to_string(), Value::Null);
        assert!(matches!(
            table.insert_row(bad, None),
            Err(Error::InvalidRecord(_))
        ));

        let mut unknown = part(Value::Null, 0, "bolt");
        unknown.shift_remove("name");
        unknown.insert("color".to_string(), Value::Text("red".into()));
        assert!(matches!(
            table.insert_row(unknown, None),
            Err(Error::UnknownColumn(_))
        ));
    }

    #[test]
    fn check_constraint_rejects_bad_rows() {
        let stmt = Parser::new_with_sql("CREATE TABLE t (id INT PRIMARY KEY, v INT CHECK (v > 0))")
            .unwrap()
            .parse_create_table_stmt()
            .unwrap();
        let (columns, constraints) = match &stmt.content {
            memdb_ast::TableContent::Columns {
                columns,
                constraints,
            } => (columns, constraints),
            other => panic!("expected columns, got {:?}", other),
        };
        let mut table =
            TableStore::new(TableSchema::from_definition("t", columns, constraints).unwrap());
        let row = Record::from([
            ("id".to_string(), Value::Integer(1)),
            ("v".to_string(), Value::Integer(0)),
        ]);
        assert!(matches!(
            table.insert_row(row, None),
            Err(Error::FailedCheckConstraint(_))
        ));
        let row = Record::from([
            ("id".to_string(), Value::Integer(1)),
            ("v".to_string(), Value::Integer(3)),
        ]);
        table.insert_row(row, None).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn find_rows_scans_in_order() {
        let mut table = parts_table();
        table
            .insert_row(part(Value::Null, 7, "bolt"), None)
            .unwrap();
        table.insert_row(part(Value::Null, 7, "nut"), None).unwrap();
        table
            .insert_row(part(Value::Null, 2, "screw"), None)
            .unwrap();

        let probe = Record::from([("stock".to_string(), Value::Integer(7))]);
        assert_eq!(
            table.find_rows(&probe, &["stock".to_string()]),
            vec![0, 1]
        );
        assert_eq!(table.find_row(&probe, &["stock".to_string()]), Some(0));

        let expr = Parser::new_with_sql("p.stock < 5")
            .unwrap()
            .parse_expr()
            .unwrap();
        let mut ctx = EvalContext::new(0);
        assert_eq!(
            table.find_rows_by_expr(&mut ctx, &expr, "p").unwrap(),
            vec![2]
        );
        assert_eq!(
            table.find_row_by_expr(&mut ctx, &expr, "p").unwrap(),
            Some(2)
        );
    }

    #[test]
    fn untyped_schema_accepts_anything() {
        let schema = TableSchema {
            name: "loose".into(),
            columns: vec![crate::schema::ColumnSchema::plain(0, "v", DataType::None)],
            checks: vec![],
        };
        let mut table = TableStore::new(schema);
        table
            .insert_row(Record::from([("v".to_string(), Value::Text("x".into()))]), None)
            .unwrap();
        table
            .insert_row(Record::from([("v".to_string(), Value::Integer(1))]), None)
            .unwrap();
        assert_eq!(table.rows.len(), 2);
    }
}
