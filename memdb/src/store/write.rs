use log::trace;
use memdb_ast::{ConflictAction, DeleteStmt, InsertSource, InsertStmt, UpdateStmt};

use crate::{
    error::{Error, Result},
    eval::EvalContext,
    record::Record,
    schema::TableSchema,
    store::Database,
    value::Value,
};

impl Database {
    /// `INSERT`: builds one record per source row, fills defaults, then hands
    /// each record to the table store with the statement's conflict action.
    ///
    /// Returns the last inserted row index: the table's row count after the
    /// insert, minus one.
    pub(crate) fn insert(&mut self, stmt: &InsertStmt) -> Result<i64> {
        let name = stmt.table.value.clone();
        let mut ctx = EvalContext::new(self.last_inserted_row_id());
        let schema = self.table(&name)?.schema.clone();

        for ident in &stmt.columns {
            if schema.column(&ident.value).is_none() {
                return Err(Error::UnknownColumn(format!(
                    "{} has no column named {}",
                    name, ident.value
                )));
            }
        }

        let records = match &stmt.source {
            InsertSource::DefaultValues => {
                vec![default_record(&schema, &mut ctx, true)?]
            }
            InsertSource::Values(rows) => {
                let empty = Record::new();
                let mut records = Vec::with_capacity(rows.len());
                for exprs in rows {
                    let mut record = default_record(&schema, &mut ctx, false)?;
                    if stmt.columns.is_empty() {
                        if exprs.len() != schema.columns.len() {
                            return Err(Error::InvalidRecord(format!(
                                "{} expects {} values, got {}",
                                name,
                                schema.columns.len(),
                                exprs.len()
                            )));
                        }
                        for (column, expr) in schema.columns.iter().zip(exprs) {
                            record.insert(column.name.clone(), ctx.eval(expr, &empty)?);
                        }
                    } else {
                        if exprs.len() != stmt.columns.len() {
                            return Err(Error::InvalidRecord(format!(
                                "{} column names but {} values",
                                stmt.columns.len(),
                                exprs.len()
                            )));
                        }
                        for (ident, expr) in stmt.columns.iter().zip(exprs) {
                            record.insert(ident.value.clone(), ctx.eval(expr, &empty)?);
                        }
                    }
                    records.push(record);
                }
                records
            }
            InsertSource::Query(query) => {
                let rows = self.execute_query(query)?;
                let mut records = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut record = default_record(&schema, &mut ctx, false)?;
                    if stmt.columns.is_empty() {
                        // map by key equality
                        for column in &schema.columns {
                            if let Some(value) = row.get(&column.name) {
                                record.insert(column.name.clone(), value.clone());
                            }
                        }
                    } else {
                        // map the result columns onto the named destination
                        // columns, in order
                        for (ident, value) in stmt.columns.iter().zip(row.values()) {
                            record.insert(ident.value.clone(), value.clone());
                        }
                    }
                    records.push(record);
                }
                records
            }
        };

        let inserted = records.len() as i64;
        let table = self.table_mut(&name)?;
        for record in records {
            trace!("insert into {}: {:?}", name, record);
            table.insert_row(record, stmt.action)?;
        }
        let row_count = table.rows.len() as i64;
        self.last_inserted_table = Some(name);
        self.rows_modified = inserted;
        Ok(row_count - 1)
    }

    /// `UPDATE`: a linear scan applying the SET clauses in original-row
    /// context, then validating each new row.
    ///
    /// Returns the number of rows modified.
    pub(crate) fn update(&mut self, stmt: &UpdateStmt) -> Result<i64> {
        let name = stmt.table.value.clone();
        let mut ctx = EvalContext::new(self.last_inserted_row_id());

        let table = self.table(&name)?;
        for assignment in &stmt.assignments {
            if table.schema.column(&assignment.target.value).is_none() {
                return Err(Error::UnknownColumn(format!(
                    "{} has no column named {}",
                    name, assignment.target.value
                )));
            }
        }
        let original_rows = table.rows.clone();

        // plan first, then apply, so a failure can restore the original rows
        let mut plan: Vec<(usize, Record)> = vec![];
        for (idx, row) in table.rows.iter().enumerate() {
            let selected = match &stmt.selection {
                Some(selection) => ctx.eval_bool(&selection.expr, row)?,
                None => true,
            };
            if !selected {
                continue;
            }
            let mut updated = row.clone();
            for assignment in &stmt.assignments {
                updated.insert(
                    assignment.target.value.clone(),
                    ctx.eval(&assignment.value, row)?,
                );
            }
            plan.push((idx, updated));
        }

        let unique_columns: Vec<String> = table
            .schema
            .columns
            .iter()
            .filter(|c| c.is_unique)
            .map(|c| c.name.clone())
            .collect();

        self.rows_modified = 0;
        let table = self.table_mut(&name)?;
        let mut modified = 0i64;
        let mut removals: Vec<usize> = vec![];
        'rows: for (idx, updated) in plan {
            if let Err(err) = table.validate_record(&updated) {
                match stmt.action {
                    Some(ConflictAction::Ignore) => continue 'rows,
                    Some(ConflictAction::Abort) => break 'rows,
                    _ => {
                        table.rows = original_rows.clone();
                        return Err(err);
                    }
                }
            }
            for column in &unique_columns {
                let value = updated.get(column).cloned().unwrap_or(Value::Null);
                if value.is_null() {
                    continue;
                }
                let conflicting = table.rows.iter().enumerate().position(|(other, row)| {
                    other != idx && !removals.contains(&other) && row.get(column) == Some(&value)
                });
                if let Some(conflicting) = conflicting {
                    match stmt.action {
                        // delete the conflicting row, then apply the update
                        Some(ConflictAction::Replace) => removals.push(conflicting),
                        Some(ConflictAction::Ignore) => continue 'rows,
                        Some(ConflictAction::Abort) => break 'rows,
                        _ => {
                            table.rows = original_rows.clone();
                            return Err(Error::DuplicateRecord(format!(
                                "duplicate value in unique column {}.{}",
                                name, column
                            )));
                        }
                    }
                }
            }
            table.rows[idx] = updated;
            modified += 1;
        }
        removals.sort_unstable();
        removals.dedup();
        for idx in removals.into_iter().rev() {
            table.rows.remove(idx);
        }

        self.rows_modified = modified;
        Ok(modified)
    }

    /// `DELETE`: without WHERE all rows go; with WHERE the scan runs in
    /// reverse index order so removal preserves the remaining indexes.
    ///
    /// Returns the number of rows removed.
    pub(crate) fn delete(&mut self, stmt: &DeleteStmt) -> Result<i64> {
        let name = stmt.table.value.clone();
        let mut ctx = EvalContext::new(self.last_inserted_row_id());
        let table = self.table_mut(&name)?;
        let removed = match &stmt.selection {
            None => {
                let count = table.rows.len() as i64;
                table.rows.clear();
                count
            }
            Some(selection) => {
                let mut count = 0i64;
                for idx in (0..table.rows.len()).rev() {
                    if ctx.eval_bool(&selection.expr, &table.rows[idx])? {
                        table.rows.remove(idx);
                        count += 1;
                    }
                }
                count
            }
        };
        self.rows_modified = removed;
        Ok(removed)
    }
}

/// Builds a record of per-column defaults: the DEFAULT expression when one is
/// declared, otherwise NULL — or empty text for the `DEFAULT VALUES` form.
/// An auto-incrementing key is always left NULL for assignment at insert.
fn default_record(
    schema: &TableSchema,
    ctx: &mut EvalContext,
    empty_text_fallback: bool,
) -> Result<Record> {
    let empty = Record::new();
    let mut record = Record::new();
    for column in &schema.columns {
        let value = if column.autoincrement {
            Value::Null
        } else {
            match &column.default {
                Some(expr) => ctx.eval(expr, &empty)?,
                None if empty_text_fallback => Value::Text(String::new()),
                None => Value::Null,
            }
        };
        record.insert(column.name.clone(), value);
    }
    Ok(record)
}
