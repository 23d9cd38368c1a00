mod ddl;
mod select;
mod write;

use indexmap::IndexMap;
use log::debug;
use memdb_ast::Stmt;
use memdb_parser::Parser;

use crate::{
    bind::bind_parameters,
    error::{Error, Result},
    record::RecordSet,
    table::TableStore,
    value::Value,
};

/// The in-memory database: a mapping from table name to table store plus the
/// transactional state, behind the `execute`/`query` façade.
///
/// The store is single-threaded and cooperative; every call completes
/// synchronously.
#[derive(Default)]
pub struct Database {
    tables: IndexMap<String, TableStore>,
    snapshot: Option<IndexMap<String, TableStore>>,
    open_transactions: usize,
    last_inserted_table: Option<String>,
    rows_modified: i64,
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds parameters, parses and runs the statements.
    ///
    /// Returns the last inserted row index for `INSERT`, the number of rows
    /// modified for `UPDATE`/`DELETE`, and `1` for everything else. Any
    /// error rolls back an open transaction before surfacing.
    pub fn execute(&mut self, sql: &str, params: &[Value]) -> Result<i64> {
        let sql = bind_parameters(sql, params)?;
        let statements = Parser::parse_statements(&sql)?;
        let mut result = 1;
        for stmt in &statements {
            debug!("execute: {}", stmt);
            match self.run_statement(stmt) {
                Ok(value) => result = value,
                Err(err) => {
                    self.rollback_open_transaction();
                    return Err(err);
                }
            }
        }
        Ok(result)
    }

    /// Binds parameters, parses and runs one or more `SELECT` statements,
    /// returning the last result set.
    ///
    /// A non-SELECT statement in the text is an invalid command; a text with
    /// no SELECT at all returns no rows.
    pub fn query(&mut self, sql: &str, params: &[Value]) -> Result<RecordSet> {
        let sql = bind_parameters(sql, params)?;
        let statements = Parser::parse_statements(&sql)?;
        let mut last = None;
        for stmt in &statements {
            debug!("query: {}", stmt);
            let result = match stmt {
                Stmt::Select(select) => self.execute_query(&select.0),
                other => Err(Error::InvalidCommand(format!(
                    "query only runs SELECT statements, got: {}",
                    other
                ))),
            };
            match result {
                Ok(rows) => last = Some(rows),
                Err(err) => {
                    self.rollback_open_transaction();
                    return Err(err);
                }
            }
        }
        last.ok_or_else(|| Error::NoRowsReturned("the query contained no SELECT".into()))
    }

    fn run_statement(&mut self, stmt: &Stmt) -> Result<i64> {
        match stmt {
            Stmt::CreateTable(create) => self.create_table(create).map(|_| 1),
            Stmt::AlterTable(alter) => self.alter_table(alter).map(|_| 1),
            Stmt::Drop(drop) => self.drop_object(drop).map(|_| 1),

            Stmt::CreateIndex(_) => Err(Error::UnsupportedCommand(
                "CREATE INDEX is not supported".into(),
            )),
            Stmt::CreateView(_) => Err(Error::UnsupportedCommand(
                "CREATE VIEW is not supported".into(),
            )),
            Stmt::CreateTrigger(_) => Err(Error::UnsupportedCommand(
                "CREATE TRIGGER is not supported".into(),
            )),

            Stmt::Insert(insert) => self.insert(insert),
            Stmt::Update(update) => self.update(update),
            Stmt::Delete(delete) => self.delete(delete),
            Stmt::Select(select) => self.execute_query(&select.0).map(|_| 1),

            Stmt::Begin(_) => self.begin_transaction().map(|_| 1),
            Stmt::Commit(_) => self.commit_transaction().map(|_| 1),
            Stmt::Rollback(rollback) => match &rollback.savepoint {
                Some(name) => Err(Error::UnsupportedCommand(format!(
                    "named savepoints are not supported: {}",
                    name
                ))),
                None => self.rollback_transaction().map(|_| 1),
            },
            Stmt::Savepoint(stmt) => Err(Error::UnsupportedCommand(format!(
                "named savepoints are not supported: {}",
                stmt.name
            ))),
            Stmt::Release(stmt) => Err(Error::UnsupportedCommand(format!(
                "named savepoints are not supported: {}",
                stmt.name
            ))),
        }
    }

    // ========================================================================
    // transactions
    // ========================================================================

    /// Opens a transaction by snapshotting the tables. Nested opens are
    /// coalesced: only the outermost snapshot is retained.
    fn begin_transaction(&mut self) -> Result<()> {
        if self.open_transactions == 0 {
            self.snapshot = Some(self.tables.clone());
        }
        self.open_transactions += 1;
        debug!("begin transaction, depth {}", self.open_transactions);
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        if self.open_transactions == 0 {
            return Err(Error::InvalidCommand("no open transaction to commit".into()));
        }
        self.open_transactions -= 1;
        if self.open_transactions == 0 {
            self.snapshot = None;
        }
        debug!("commit, depth {}", self.open_transactions);
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        if self.open_transactions == 0 {
            return Err(Error::InvalidCommand(
                "no open transaction to roll back".into(),
            ));
        }
        if let Some(snapshot) = &self.snapshot {
            self.tables = snapshot.clone();
        }
        self.open_transactions -= 1;
        if self.open_transactions == 0 {
            self.snapshot = None;
        }
        debug!("rollback, depth {}", self.open_transactions);
        Ok(())
    }

    /// Reverts to the snapshot when a statement fails inside an open
    /// transaction.
    fn rollback_open_transaction(&mut self) {
        if self.open_transactions == 0 {
            return;
        }
        debug!("error inside a transaction, rolling back");
        if let Some(snapshot) = self.snapshot.take() {
            self.tables = snapshot;
        }
        self.open_transactions = 0;
    }

    // ========================================================================
    // introspection
    // ========================================================================

    /// Whether a table with the given name exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// The table names, in creation order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Read access to a table's store.
    pub fn table(&self, name: &str) -> Result<&TableStore> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> Result<&mut TableStore> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// The integer primary key of the last row of the table last inserted
    /// into, falling back to that row's index; zero before any insert.
    pub fn last_inserted_row_id(&self) -> i64 {
        let table = match self
            .last_inserted_table
            .as_ref()
            .and_then(|name| self.tables.get(name))
        {
            Some(table) => table,
            None => return 0,
        };
        match table.last_primary_key_value() {
            Some(Value::Integer(v)) => *v,
            _ => table.rows.len() as i64 - 1,
        }
    }

    /// How many rows the last INSERT, UPDATE or DELETE touched.
    pub fn number_of_records_changed(&self) -> i64 {
        self.rows_modified
    }

    /// Whether a transaction is open.
    pub fn is_transaction_open(&self) -> bool {
        self.open_transactions > 0
    }
}
