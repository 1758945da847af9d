//! Runs generated statements against SQLite and routes result rows back
//! into registered columns.
//!
//! The generation core never executes anything; this module is the
//! boundary where finished SQL text meets a [`rusqlite::Connection`]. A
//! query hands each result row to a callback as a column count, textual
//! cell values and column names, and the callback decides whether
//! iteration continues. Ingestion matches result columns to table columns
//! by rendered name: qualified (`table.column`) when the result name
//! contains a dot, bare otherwise.

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tracing::debug;

use crate::error::{Result, SqlGenError};
use crate::expr::{CompareExpr, Expr};
use crate::table::{ColumnRef, InsertMode, Join, SortTerm, Table};

/// What a per-row callback returns: keep iterating or abort the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowControl {
    Continue,
    Abort,
}

fn cell_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(r) => Some(r.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

// ------------- Executor -------------

/// Wraps a SQLite connection behind the synchronous query-executor
/// capability the generators hand finished text to.
pub struct SqliteExecutor {
    db: Connection,
}

impl SqliteExecutor {
    pub fn open(path: &str) -> Result<Self> {
        Ok(SqliteExecutor {
            db: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(SqliteExecutor {
            db: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.db
    }

    /// Executes finished statement text; newline-joined multi-statement
    /// output runs as a batch.
    pub fn execute_batch(&self, sql: &Expr) -> Result<()> {
        debug!(statements = sql.as_str(), "executing batch");
        self.db.execute_batch(sql.as_str())?;
        Ok(())
    }

    /// Runs a query and hands every result row to the callback as
    /// (column count, textual cells, column names). Null cells arrive as
    /// `None`. A callback returning [`RowControl::Abort`] stops iteration
    /// without an error.
    pub fn execute_query<F>(&self, sql: &Expr, mut on_row: F) -> Result<()>
    where
        F: FnMut(usize, &[Option<String>], &[String]) -> RowControl,
    {
        debug!(statement = sql.as_str(), "executing query");
        let mut statement = self.db.prepare(sql.as_str())?;
        let names: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let count = names.len();
        let mut rows = statement.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(count);
            for i in 0..count {
                cells.push(cell_text(row.get_ref(i)?));
            }
            if on_row(count, &cells, &names) == RowControl::Abort {
                break;
            }
        }
        Ok(())
    }
}

/// Routes one result row into the matching columns of the given tables.
///
/// Each cell goes to the first column per table whose rendered name equals
/// the result column's name; null cells are skipped. Row indices stay
/// aligned only if callers feed rows one at a time, in order.
pub fn ingest_row(
    tables: &mut [&mut Table],
    names: &[String],
    cells: &[Option<String>],
) -> Result<()> {
    for (name, cell) in names.iter().zip(cells) {
        let Some(text) = cell else { continue };
        let delimiter = if name.contains('.') { Some('.') } else { None };
        for table in tables.iter_mut() {
            table.ingest_text_by_name(name, delimiter, text)?;
        }
    }
    Ok(())
}

// ------------- Table binding -------------

/// Binds an owned table to an executor, so statements can be generated
/// and executed in one call.
pub struct SqliteTable<'db> {
    table: Table,
    db: &'db SqliteExecutor,
}

impl<'db> SqliteTable<'db> {
    pub fn new(table: Table, db: &'db SqliteExecutor) -> Self {
        SqliteTable { table, db }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn create_table(&self) -> Result<()> {
        self.db.execute_batch(&self.table.sql_table_create())
    }

    pub fn drop_table(&self) -> Result<()> {
        self.db.execute_batch(&self.table.sql_table_drop())
    }

    pub fn insert_rows(&self, mode: InsertMode) -> Result<()> {
        self.db.execute_batch(&self.table.sql_rows_insert(mode))
    }

    pub fn update_rows(&self, condition: &CompareExpr, limit: usize, offset: usize) -> Result<()> {
        self.db
            .execute_batch(&self.table.sql_rows_update(condition, limit, offset))
    }

    pub fn delete_rows(&self, condition: &CompareExpr, limit: usize, offset: usize) -> Result<()> {
        self.db
            .execute_batch(&self.table.sql_rows_delete(condition, limit, offset))
    }

    /// Generates a SELECT from the bound table's metadata and runs it with
    /// [`Self::run_select`].
    pub fn select_rows(
        &mut self,
        projection: &[ColumnRef<'_>],
        joins: &[Join],
        condition: &CompareExpr,
        sort: &[SortTerm<'_>],
        limit: usize,
        offset: usize,
        on_row: impl FnMut(usize),
    ) -> Result<usize> {
        let sql = self
            .table
            .sql_rows_select(projection, joins, condition, sort, limit, offset);
        self.run_select(&sql, on_row)
    }

    /// Executes a SELECT and ingests every result row into the bound
    /// table's columns, invoking the handler with each row index. Returns
    /// the number of rows ingested.
    pub fn run_select(&mut self, sql: &Expr, mut on_row: impl FnMut(usize)) -> Result<usize> {
        let mut collected: Vec<(Vec<Option<String>>, Vec<String>)> = Vec::new();
        self.db.execute_query(sql, |_, cells, names| {
            collected.push((cells.to_vec(), names.to_vec()));
            RowControl::Continue
        })?;
        let count = collected.len();
        for (row_index, (cells, names)) in collected.into_iter().enumerate() {
            ingest_row(&mut [&mut self.table], &names, &cells)?;
            on_row(row_index);
        }
        Ok(count)
    }

    /// Wraps any SELECT text in COUNT(*) and reports the single integer
    /// result to the sink.
    pub fn count_rows(&self, inner: &Expr, mut sink: impl FnMut(usize)) -> Result<()> {
        let sql = self.table.sql_rows_count(inner);
        let mut outcome: Option<usize> = None;
        self.db.execute_query(&sql, |columns, cells, _names| {
            if columns == 1 {
                if let Some(Some(text)) = cells.first() {
                    outcome = text.parse().ok();
                }
            }
            RowControl::Abort
        })?;
        match outcome {
            Some(count) => {
                sink(count);
                Ok(())
            }
            None => Err(SqlGenError::Execution(
                "count query returned no usable row".to_owned(),
            )),
        }
    }
}
