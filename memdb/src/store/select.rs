use core::cmp::Ordering;

use itertools::Itertools;
use log::trace;
use memdb_ast::{
    Expr, From, Join, JoinOperator, JoinSpec, ObjectName, Query, SelectItem, SetQuantifier,
    TableRef, TableReference,
};

use crate::{
    error::{Error, Result},
    eval::{contains_aggregate, AggregatePass, EvalContext},
    record::{lookup_column, Record, RecordSet},
    store::Database,
    value::Value,
};

/// The rows accumulated while walking a join tree, together with the bare
/// column names they expose (used to derive NATURAL join columns) and the
/// full key set each row carries (used to pad LEFT OUTER misses).
struct Source {
    rows: Vec<Record>,
    columns: Vec<String>,
    keys: Vec<String>,
}

impl Source {
    fn empty() -> Self {
        Self {
            rows: vec![Record::new()],
            columns: vec![],
            keys: vec![],
        }
    }

    fn absorb_names(&mut self, other: &Source) {
        for column in &other.columns {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        for key in &other.keys {
            if !self.keys.contains(key) {
                self.keys.push(key.clone());
            }
        }
    }
}

impl Database {
    /// Runs one `SELECT` query and materializes its result set.
    pub(crate) fn execute_query(&self, query: &Query) -> Result<RecordSet> {
        let source = match &query.from {
            Some(from) => self.accumulate_from(from)?,
            None => Source::empty(),
        };
        let mut ctx = EvalContext::new(self.last_inserted_row_id());

        let has_aggregates = query
            .projection
            .iter()
            .any(|item| matches!(item, SelectItem::DerivedColumn { expr, .. } if contains_aggregate(expr)))
            || selection_has_aggregate(query);

        // WHERE must evaluate to a boolean
        let mut included = Vec::with_capacity(source.rows.len());
        for row in source.rows {
            let selected = match &query.selection {
                Some(selection) => ctx.eval_bool(&selection.expr, &row)?,
                None => true,
            };
            if selected {
                included.push(row);
            }
        }
        trace!("select: {} rows after WHERE", included.len());

        // pairs of (source row, result row); ORDER BY may reference source
        // columns the projection dropped
        let mut paired: Vec<(Record, Record)> = vec![];
        if query.group_by.is_some() || has_aggregates {
            let group_columns: Vec<String> = query
                .group_by
                .as_ref()
                .map(|group_by| group_by.columns.iter().map(object_name_key).collect())
                .unwrap_or_default();

            let mut sorted = included;
            sorted.sort_by(|a, b| compare_on_columns(a, b, &group_columns));

            // fold adjacent rows that agree on the grouping columns; the
            // aggregate accumulate/report cycle runs per group
            for (_, group) in &sorted
                .iter()
                .chunk_by(|row| group_key(row, &group_columns))
            {
                let rows: Vec<&Record> = group.collect();
                ctx.reset_accumulators();
                if has_aggregates {
                    ctx.set_pass(AggregatePass::Accumulate);
                    for row in &rows {
                        self.accumulate_row(&mut ctx, query, row)?;
                    }
                    ctx.set_pass(AggregatePass::Report);
                }
                let representative = (*rows[0]).clone();
                if let Some(having) = &query.having {
                    if !ctx.eval_bool(&having.expr, &representative)? {
                        continue;
                    }
                }
                let result = materialize(&mut ctx, &query.projection, &representative)?;
                paired.push((representative, result));
            }

            // aggregates over an empty set still report one row
            if sorted.is_empty() && query.group_by.is_none() {
                ctx.reset_accumulators();
                ctx.set_pass(AggregatePass::Report);
                let representative = Record::new();
                let keep = match &query.having {
                    Some(having) => ctx.eval_bool(&having.expr, &representative)?,
                    None => true,
                };
                if keep {
                    let result = materialize(&mut ctx, &query.projection, &representative)?;
                    paired.push((representative, result));
                }
            }
        } else {
            for row in included {
                if let Some(having) = &query.having {
                    if !ctx.eval_bool(&having.expr, &row)? {
                        continue;
                    }
                }
                let result = materialize(&mut ctx, &query.projection, &row)?;
                paired.push((row, result));
            }
        }

        if query.quantifier == Some(SetQuantifier::Distinct) {
            let mut seen: Vec<Record> = vec![];
            paired.retain(|(_, result)| {
                if seen.contains(result) {
                    false
                } else {
                    seen.push(result.clone());
                    true
                }
            });
        }

        // stable sort per clause, in declaration order
        if let Some(order_by) = &query.order_by {
            let keys: Vec<(String, bool)> = order_by
                .list
                .iter()
                .map(|spec| (object_name_key(&spec.column), spec.asc.unwrap_or(true)))
                .collect();
            if let Some((source_row, result_row)) = paired.first() {
                for (key, _) in &keys {
                    if lookup_column(result_row, key).is_none()
                        && lookup_column(source_row, key).is_none()
                    {
                        return Err(Error::UnknownColumn(key.clone()));
                    }
                }
            }
            paired.sort_by(|(a_source, a_result), (b_source, b_result)| {
                for (key, ascending) in &keys {
                    let a = lookup_column(a_result, key)
                        .or_else(|| lookup_column(a_source, key))
                        .unwrap_or(&Value::Null);
                    let b = lookup_column(b_result, key)
                        .or_else(|| lookup_column(b_source, key))
                        .unwrap_or(&Value::Null);
                    let ordering = if *ascending {
                        a.sort_cmp(b)
                    } else {
                        b.sort_cmp(a)
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let mut results: Vec<Record> = paired.into_iter().map(|(_, result)| result).collect();

        // negative bounds disable themselves
        if let Some(limit) = &query.limit {
            let offset = limit.offset.unwrap_or(0).max(0) as usize;
            results = if offset >= results.len() {
                vec![]
            } else {
                results.split_off(offset)
            };
            if limit.count >= 0 {
                results.truncate(limit.count as usize);
            }
        }

        Ok(results)
    }

    /// Feeds every aggregate in the projection and HAVING clause for one row.
    fn accumulate_row(&self, ctx: &mut EvalContext, query: &Query, row: &Record) -> Result<()> {
        for item in &query.projection {
            if let SelectItem::DerivedColumn { expr, .. } = item {
                if contains_aggregate(expr) {
                    ctx.eval(expr, row)?;
                }
            }
        }
        if let Some(having) = &query.having {
            if contains_aggregate(&having.expr) {
                ctx.eval(&having.expr, row)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // join-tree accumulation
    // ========================================================================

    fn accumulate_from(&self, from: &From) -> Result<Source> {
        let mut accumulated: Option<Source> = None;
        for reference in &from.list {
            let source = self.accumulate_reference(reference)?;
            accumulated = Some(match accumulated {
                None => source,
                // a comma in FROM is a Cartesian product
                Some(parent) => cross_product(parent, source),
            });
        }
        Ok(accumulated.unwrap_or_else(Source::empty))
    }

    fn accumulate_reference(&self, reference: &TableReference) -> Result<Source> {
        let mut source = self.realize_table(&reference.relation)?;
        for join in &reference.joins {
            source = self.apply_join(source, join)?;
        }
        Ok(source)
    }

    /// Loads a table's rows, exposing every column under both its bare name
    /// and its `alias.column` name.
    fn realize_table(&self, table_ref: &TableRef) -> Result<Source> {
        let table = self.table(&table_ref.name.value)?;
        let alias = table_ref
            .alias
            .as_ref()
            .map(|alias| alias.value.as_str())
            .unwrap_or(&table_ref.name.value);
        let rows = table
            .rows
            .iter()
            .map(|row| table.qualified_record(row, alias))
            .collect();
        let columns: Vec<String> = table
            .schema
            .columns
            .iter()
            .map(|column| column.name.clone())
            .collect();
        let mut keys = columns.clone();
        keys.extend(columns.iter().map(|column| format!("{}.{}", alias, column)));
        Ok(Source {
            rows,
            columns,
            keys,
        })
    }

    fn apply_join(&self, parent: Source, join: &Join) -> Result<Source> {
        let child = self.realize_table(&join.relation)?;
        match &join.op {
            JoinOperator::Cross => Ok(cross_product(parent, child)),
            JoinOperator::Inner(None) => Ok(cross_product(parent, child)),
            JoinOperator::Inner(Some(spec)) => self.joined(parent, child, spec, false),
            JoinOperator::LeftOuter(spec) => {
                let spec = match spec {
                    Some(spec) => spec.clone(),
                    // no condition: every pairing matches
                    None => JoinSpec::Using(vec![]),
                };
                self.joined(parent, child, &spec, true)
            }
            JoinOperator::Natural => {
                // the shared column names; no overlap degrades to CROSS
                let using: Vec<memdb_ast::Ident> = parent
                    .columns
                    .iter()
                    .filter(|column| child.columns.contains(column))
                    .map(|column| memdb_ast::Ident::new(column.clone()))
                    .collect();
                if using.is_empty() {
                    Ok(cross_product(parent, child))
                } else {
                    self.joined(parent, child, &JoinSpec::Using(using), false)
                }
            }
        }
    }

    /// Inner or left-outer join of an accumulated parent against one table.
    fn joined(
        &self,
        parent: Source,
        child: Source,
        spec: &JoinSpec,
        left_outer: bool,
    ) -> Result<Source> {
        let mut ctx = EvalContext::new(self.last_inserted_row_id());
        let mut rows = vec![];
        for parent_row in &parent.rows {
            let mut matched = false;
            for child_row in &child.rows {
                let merged = merge_records(parent_row, child_row);
                let keep = match spec {
                    JoinSpec::On(expr) => ctx.eval_bool(expr, &merged)?,
                    JoinSpec::Using(columns) => columns.iter().all(|column| {
                        let left = lookup_column(parent_row, &column.value);
                        let right = lookup_column(child_row, &column.value);
                        match (left, right) {
                            (Some(left), Some(right)) => !left.is_null() && left == right,
                            _ => false,
                        }
                    }),
                };
                if keep {
                    matched = true;
                    rows.push(merged);
                }
            }
            if left_outer && !matched {
                // pad the right side with empty values
                let mut padded = parent_row.clone();
                for key in &child.keys {
                    padded
                        .entry(key.clone())
                        .or_insert_with(|| Value::Text(String::new()));
                }
                rows.push(padded);
            }
        }
        let mut joined = Source {
            rows,
            columns: parent.columns,
            keys: parent.keys,
        };
        joined.absorb_names(&child);
        Ok(joined)
    }
}

fn cross_product(parent: Source, child: Source) -> Source {
    let mut rows = Vec::with_capacity(parent.rows.len() * child.rows.len());
    for parent_row in &parent.rows {
        for child_row in &child.rows {
            rows.push(merge_records(parent_row, child_row));
        }
    }
    let mut product = Source {
        rows,
        columns: parent.columns,
        keys: parent.keys,
    };
    product.absorb_names(&child);
    product
}

/// Merges a child row into a parent row. The parent's bare names win;
/// qualified names never collide.
fn merge_records(parent: &Record, child: &Record) -> Record {
    let mut merged = parent.clone();
    for (key, value) in child {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Evaluates the projection for one row.
fn materialize(
    ctx: &mut EvalContext,
    projection: &[SelectItem],
    row: &Record,
) -> Result<Record> {
    let mut result = Record::new();
    for (idx, item) in projection.iter().enumerate() {
        match item {
            SelectItem::Wildcard => {
                for (key, value) in row {
                    result.insert(key.clone(), value.clone());
                }
            }
            SelectItem::QualifiedWildcard(prefix) => {
                let prefix = format!("{}.", prefix);
                for (key, value) in row {
                    if key.starts_with(&prefix) {
                        result.insert(key.clone(), value.clone());
                    }
                }
            }
            SelectItem::DerivedColumn { expr, alias } => {
                let name = match alias {
                    Some(alias) => alias.value.clone(),
                    None => derived_column_name(expr, idx),
                };
                let value = ctx.eval(expr, row)?;
                result.insert(name, value);
            }
        }
    }
    Ok(result)
}

/// The result name of an unaliased projection expression: the column's bare
/// name when it is a column reference, a synthetic `ColN` otherwise.
fn derived_column_name(expr: &Expr, idx: usize) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(idents) => idents
            .last()
            .map(|ident| ident.value.clone())
            .unwrap_or_else(|| format!("Col{}", idx + 1)),
        Expr::Nested(inner) => derived_column_name(inner, idx),
        _ => format!("Col{}", idx + 1),
    }
}

fn object_name_key(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|ident| ident.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

fn selection_has_aggregate(query: &Query) -> bool {
    query
        .selection
        .as_ref()
        .map(|selection| contains_aggregate(&selection.expr))
        .unwrap_or(false)
        || query
            .having
            .as_ref()
            .map(|having| contains_aggregate(&having.expr))
            .unwrap_or(false)
}

fn compare_on_columns(a: &Record, b: &Record, columns: &[String]) -> Ordering {
    for column in columns {
        let left = lookup_column(a, column).unwrap_or(&Value::Null);
        let right = lookup_column(b, column).unwrap_or(&Value::Null);
        let ordering = left.sort_cmp(right);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn group_key(row: &Record, columns: &[String]) -> Vec<Value> {
    columns
        .iter()
        .map(|column| lookup_column(row, column).cloned().unwrap_or(Value::Null))
        .collect()
}
