//! Tables, typed columns and the statement generators.
//!
//! A [`Table`] owns an ordered list of registered columns; schema structs
//! own the table and keep [`Col`] handles to the columns they declared.
//! Rows are appended column-wise through [`Table::add_row`], and every
//! statement generator is a pure read over the column metadata and the
//! current row buffers. The rendered text follows an exact whitespace and
//! delimiter contract: column and value lists are newline-delimited,
//! every statement ends in a single `;`, and multi-statement output is
//! newline-joined.

use std::fmt;
use std::marker::PhantomData;

use crate::datatype::{ColumnSpec, ColumnType, SqlDefault, SqlValue, Value};
use crate::error::{Result, SqlGenError};
use crate::expr::{CompareExpr, Expr, Name};

/// Builds a row of [`Value`]s out of native values, for [`Table::add_row`].
/// Text literals (`&str`) coerce to text values.
#[macro_export]
macro_rules! row {
    [] => { ::std::vec::Vec::<$crate::datatype::Value>::new() };
    [$($value:expr),+ $(,)?] => {
        vec![$($crate::datatype::Value::from($value)),+]
    };
}

// ------------- Column declaration -------------

/// Declares a typed column before registration. The type parameter fixes
/// the semantic column type at schema-definition time.
pub struct ColumnDef<T: SqlValue> {
    name: Name,
    spec: ColumnSpec,
    default: Option<T>,
}

impl<T: SqlValue> ColumnDef<T> {
    pub fn new(name: impl Into<Name>) -> Self {
        ColumnDef {
            name: name.into(),
            spec: ColumnSpec::empty(),
            default: None,
        }
    }

    /// A column with a blank name; registration assigns `COLUMN_<index>`.
    pub fn anonymous() -> Self {
        ColumnDef::new("")
    }

    pub fn spec(mut self, spec: ColumnSpec) -> Self {
        self.spec = spec;
        self
    }

    /// An explicit default value; implies the DEFAULT specifier.
    pub fn default_value(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }
}

/// Typed handle to a registered column, resolved through the owning table.
pub struct Col<T> {
    index: usize,
    _type: PhantomData<T>,
}

impl<T> Clone for Col<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Col<T> {}

// ------------- Column -------------

/// A registered column: declared type and specifiers, resolved default,
/// and the ordered row buffer awaiting INSERT/UPDATE emission.
#[derive(Debug, Clone)]
pub struct Column {
    name: Name,
    table: Name,
    column_type: ColumnType,
    spec: ColumnSpec,
    default: SqlDefault,
    rows: Vec<Value>,
}

impl Column {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn spec(&self) -> ColumnSpec {
        self.spec
    }

    pub fn rows_count(&self) -> usize {
        self.rows.len()
    }

    /// The buffered row values, in insertion order.
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    /// The column's rendered name: `table<delimiter>column` when a
    /// delimiter is given and the column is registered, bare otherwise.
    pub fn sql_name(&self, delimiter: Option<char>) -> Expr {
        match delimiter {
            Some(d) if !self.table.is_empty() => Expr::new(format!("{}{}{}", self.table, d, self.name)),
            _ => Expr::new(self.name.as_str()),
        }
    }

    pub fn sql_default_value(&self) -> Expr {
        Expr::new(self.default.render())
    }

    /// The value emitted for a row index: the buffered value (quoted for
    /// text), falling back to the resolved default for missing rows.
    pub fn sql_row_value(&self, row_index: usize) -> Expr {
        match self.rows.get(row_index) {
            Some(value) => Expr::new(value.sql_literal()),
            None => self.sql_default_value(),
        }
    }

    /// The column's definition inside CREATE TABLE.
    pub fn sql_create_fragment(&self) -> Expr {
        let mut sql = format!("{} {}", self.name, self.column_type.keyword());
        if self.spec.is_primary_key() {
            sql.push_str(" PRIMARY KEY");
        }
        if self.spec.is_autoincrement() {
            sql.push_str(" AUTOINCREMENT");
        }
        if self.spec.is_not_null() {
            sql.push_str(" NOT NULL");
        }
        if self.spec.has_default() {
            sql.push_str(" DEFAULT");
        }
        if self.spec.value_required() {
            sql.push(' ');
            sql.push_str(&self.default.render());
        }
        Expr::new(sql)
    }

    /// Parses a textual result cell into this column's type and appends it
    /// as a new row value.
    pub fn ingest_text(&mut self, text: &str) -> Result<()> {
        let value = self.column_type.parse_text(text)?;
        self.rows.push(value);
        Ok(())
    }
}

/// Borrow of a registered column, used to build conditions, projections
/// and sort terms.
#[derive(Clone, Copy)]
pub struct ColumnRef<'a> {
    column: &'a Column,
}

impl<'a> ColumnRef<'a> {
    pub fn column(&self) -> &'a Column {
        self.column
    }

    pub fn gt(self, second: impl Into<CompareExpr>) -> CompareExpr {
        CompareExpr::from(self).gt(second)
    }

    pub fn lt(self, second: impl Into<CompareExpr>) -> CompareExpr {
        CompareExpr::from(self).lt(second)
    }

    pub fn eq(self, second: impl Into<CompareExpr>) -> CompareExpr {
        CompareExpr::from(self).eq(second)
    }

    pub fn ne(self, second: impl Into<CompareExpr>) -> CompareExpr {
        CompareExpr::from(self).ne(second)
    }

    pub fn is_in(self, second: impl Into<CompareExpr>) -> CompareExpr {
        CompareExpr::from(self).is_in(second)
    }

    pub fn asc(self) -> SortTerm<'a> {
        SortTerm {
            column: self,
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(self) -> SortTerm<'a> {
        SortTerm {
            column: self,
            direction: SortDirection::Descending,
        }
    }
}

impl From<ColumnRef<'_>> for CompareExpr {
    /// A column operand stands for its qualified name.
    fn from(column: ColumnRef<'_>) -> Self {
        CompareExpr::raw(column.column.sql_name(Some('.')).as_str())
    }
}

// ------------- Join and sort descriptors -------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Outer,
    Left,
    Right,
}

impl JoinKind {
    fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Outer => "OUTER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

/// One JOIN clause of a SELECT statement.
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    table: Name,
    condition: CompareExpr,
}

impl Join {
    pub fn new(kind: JoinKind, table: impl Into<Name>, condition: CompareExpr) -> Self {
        Join {
            kind,
            table: table.into(),
            condition,
        }
    }

    pub fn table(kind: JoinKind, table: &Table, condition: CompareExpr) -> Self {
        Join::new(kind, table.name().clone(), condition)
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} JOIN {}", self.kind.keyword(), self.table)?;
        if !self.condition.is_empty() {
            write!(f, " ON {}", self.condition)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Default,
    Ascending,
    Descending,
}

/// One ORDER BY term; the default direction emits no keyword.
#[derive(Clone, Copy)]
pub struct SortTerm<'a> {
    pub column: ColumnRef<'a>,
    pub direction: SortDirection,
}

impl<'a> From<ColumnRef<'a>> for SortTerm<'a> {
    fn from(column: ColumnRef<'a>) -> Self {
        SortTerm {
            column,
            direction: SortDirection::Default,
        }
    }
}

/// Whether INSERT emits literal row values or named placeholders for
/// prepared-statement binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    Literal,
    Parameter,
}

// ------------- Table -------------

/// An ordered, named collection of columns plus the statement generators.
#[derive(Debug, Clone)]
pub struct Table {
    name: Name,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<Name>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Registers a declared column and returns its typed handle. A blank
    /// declared name becomes `COLUMN_<index>` with the zero-based
    /// registration position. Statements iterate columns in registration
    /// order.
    pub fn register<T: SqlValue>(&mut self, def: ColumnDef<T>) -> Col<T> {
        let index = self.columns.len();
        let name = if def.name.is_empty() {
            Name::new(format!("COLUMN_{index}"))
        } else {
            def.name
        };
        let mut spec = def.spec;
        let default = match def.default {
            Some(value) => {
                spec |= ColumnSpec::DEFAULT;
                SqlDefault::of(value.into())
            }
            None if spec.value_required() => SqlDefault::zero(T::COLUMN_TYPE),
            None => SqlDefault::null(),
        };
        self.columns.push(Column {
            name,
            table: self.name.clone(),
            column_type: T::COLUMN_TYPE,
            spec,
            default,
            rows: Vec::new(),
        });
        Col {
            index,
            _type: PhantomData,
        }
    }

    /// Resolves a typed handle into a column borrow.
    pub fn col<T: SqlValue>(&self, col: Col<T>) -> ColumnRef<'_> {
        ColumnRef {
            column: &self.columns[col.index],
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Appends one row across all columns. The call either commits a value
    /// to every column or leaves every row buffer untouched: arity is
    /// checked first, then each value's type against its column's declared
    /// type, and nothing is written until every position matches.
    pub fn add_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(SqlGenError::ValueCount {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (index, (column, value)) in self.columns.iter().zip(&values).enumerate() {
            if value.column_type() != column.column_type {
                return Err(SqlGenError::ValueType {
                    index,
                    expected: column.column_type,
                    actual: value.column_type(),
                });
            }
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.rows.push(value);
        }
        Ok(())
    }

    /// Empties every column's row buffer; the schema is untouched.
    pub fn clear_rows(&mut self) {
        for column in &mut self.columns {
            column.clear_rows();
        }
    }

    /// The longest row buffer across all columns. Governs how many INSERT
    /// and UPDATE statements are emitted; shorter columns fall back to
    /// their resolved default for the missing indices.
    pub fn max_rows_count(&self) -> usize {
        self.columns
            .iter()
            .map(Column::rows_count)
            .max()
            .unwrap_or(0)
    }

    /// Appends a textual result cell to the first column whose rendered
    /// name matches. Returns whether a column matched.
    pub fn ingest_text_by_name(
        &mut self,
        name: &str,
        delimiter: Option<char>,
        text: &str,
    ) -> Result<bool> {
        for column in &mut self.columns {
            if column.sql_name(delimiter).as_str() == name {
                column.ingest_text(text)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ------------- Statement generators -------------

    pub fn sql_table_create(&self) -> Expr {
        let definitions: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.sql_create_fragment().to_string())
            .collect();
        Expr::new(format!(
            "CREATE TABLE {} (\n{}\n);",
            self.name,
            definitions.join(",\n")
        ))
    }

    pub fn sql_table_drop(&self) -> Expr {
        Expr::new(format!("DROP TABLE {};", self.name))
    }

    /// One INSERT statement per buffered row index, newline-joined.
    /// Autoincrement columns are excluded from both lists. Parameter mode
    /// emits `:<column-name>_<row-index>` placeholders instead of
    /// literals.
    pub fn sql_rows_insert(&self, mode: InsertMode) -> Expr {
        let columns: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| !c.spec.is_autoincrement())
            .collect();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();

        let mut statements = Vec::new();
        for row_index in 0..self.max_rows_count() {
            let values: Vec<String> = columns
                .iter()
                .map(|c| match mode {
                    InsertMode::Literal => c.sql_row_value(row_index).to_string(),
                    InsertMode::Parameter => format!(":{}_{}", c.name, row_index),
                })
                .collect();
            statements.push(format!(
                "INSERT INTO {} (\n{}\n)\nVALUES (\n{}\n);",
                self.name,
                names.join(",\n"),
                values.join(",\n")
            ));
        }
        Expr::new(statements.join("\n"))
    }

    /// One UPDATE statement per buffered row index, all sharing the same
    /// condition, limit and offset. Callers that need per-row targeting
    /// call once per row with a row-specific condition.
    pub fn sql_rows_update(&self, condition: &CompareExpr, limit: usize, offset: usize) -> Expr {
        let mut statements = Vec::new();
        for row_index in 0..self.max_rows_count() {
            let assignments: Vec<String> = self
                .columns
                .iter()
                .filter(|c| !c.spec.is_autoincrement())
                .map(|c| format!("{}={}", c.name, c.sql_row_value(row_index)))
                .collect();
            let mut sql = format!("UPDATE {} SET\n{}", self.name, assignments.join(",\n"));
            push_filter_clauses(&mut sql, condition, limit, offset);
            sql.push(';');
            statements.push(sql);
        }
        Expr::new(statements.join("\n"))
    }

    /// An empty projection selects `table.*`; a default sort direction
    /// emits no keyword; limit and offset of zero omit their clauses.
    pub fn sql_rows_select(
        &self,
        projection: &[ColumnRef<'_>],
        joins: &[Join],
        condition: &CompareExpr,
        sort: &[SortTerm<'_>],
        limit: usize,
        offset: usize,
    ) -> Expr {
        let mut sql = String::from("SELECT");
        if projection.is_empty() {
            sql.push_str(&format!("\n{}.*", self.name));
        } else {
            let names: Vec<String> = projection
                .iter()
                .map(|c| c.column.sql_name(Some('.')).to_string())
                .collect();
            sql.push('\n');
            sql.push_str(&names.join(",\n"));
        }
        sql.push_str(&format!("\nFROM {}", self.name));
        for join in joins {
            sql.push_str(&format!("\n{join}"));
        }
        if !condition.is_empty() {
            sql.push_str(&format!("\nWHERE {condition}"));
        }
        if !sort.is_empty() {
            sql.push_str("\nORDER BY");
            let terms: Vec<String> = sort
                .iter()
                .map(|term| {
                    let mut rendered = format!(" {}", term.column.column.sql_name(Some('.')));
                    match term.direction {
                        SortDirection::Ascending => rendered.push_str(" ASC"),
                        SortDirection::Descending => rendered.push_str(" DESC"),
                        SortDirection::Default => {}
                    }
                    rendered
                })
                .collect();
            sql.push_str(&terms.join(","));
        }
        if limit > 0 {
            sql.push_str(&format!("\nLIMIT {limit}"));
        }
        if offset > 0 {
            sql.push_str(&format!("\nOFFSET {offset}"));
        }
        sql.push(';');
        Expr::new(sql)
    }

    pub fn sql_rows_delete(&self, condition: &CompareExpr, limit: usize, offset: usize) -> Expr {
        let mut sql = format!("DELETE FROM {}", self.name);
        push_filter_clauses(&mut sql, condition, limit, offset);
        sql.push(';');
        Expr::new(sql)
    }

    /// Wraps any SELECT text in a COUNT(*) query; the inner statement's
    /// trailing `;` is stripped before nesting.
    pub fn sql_rows_count(&self, inner: &Expr) -> Expr {
        let stripped = inner.as_str().strip_suffix(';').unwrap_or(inner.as_str());
        Expr::new(format!("SELECT COUNT(*) FROM (\n{stripped}\n);"))
    }
}

fn push_filter_clauses(sql: &mut String, condition: &CompareExpr, limit: usize, offset: usize) {
    if !condition.is_empty() {
        sql.push_str(&format!("\nWHERE {condition}"));
    }
    if limit > 0 {
        sql.push_str(&format!("\nLIMIT {limit}"));
    }
    if offset > 0 {
        sql.push_str(&format!("\nOFFSET {offset}"));
    }
}
