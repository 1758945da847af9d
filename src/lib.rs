//! Sqlgen – a typed SQL statement-generation engine.
//!
//! A schema is declared once as a named [`table::Table`] owning typed,
//! constrained columns; rows are buffered column-wise through a single
//! validated call; and the statement generators turn the metadata plus
//! the row buffers into byte-exact SQL text for CREATE/DROP TABLE,
//! INSERT, UPDATE, SELECT (with joins, filters, ordering and paging) and
//! DELETE. Conditions come from a small composable expression language
//! that parenthesizes every combination, so precedence never depends on
//! nesting depth.
//!
//! ## Modules
//! * [`datatype`] – Semantic column types, specifiers, row values and
//!   default-value resolution.
//! * [`expr`] – Identifier/fragment newtypes and the comparison
//!   expression builder.
//! * [`table`] – Tables, typed columns, join/sort descriptors and the
//!   statement generators.
//! * [`persist`] – The SQLite execution adapter: runs generated text and
//!   feeds result rows back into columns by name.
//! * [`error`] – The error taxonomy ([`error::SqlGenError`]).
//!
//! ## Quick Start
//! ```
//! use sqlgen::datatype::ColumnSpec;
//! use sqlgen::row;
//! use sqlgen::table::{ColumnDef, Table};
//!
//! let mut table = Table::new("T1");
//! let id = table.register(
//!     ColumnDef::<i64>::new("ID").spec(ColumnSpec::PRIMARY_KEY | ColumnSpec::AUTOINCREMENT),
//! );
//! let _c1 = table.register(ColumnDef::<f64>::new("C1").default_value(3.14));
//! table.add_row(row![0i64, 1.23]).unwrap();
//!
//! let condition = table.col(id).gt(100i64);
//! assert_eq!(
//!     table.sql_rows_select(&[], &[], &condition, &[], 0, 0).as_str(),
//!     "SELECT\nT1.*\nFROM T1\nWHERE ((T1.ID) > (100));"
//! );
//! ```
//!
//! ## Execution
//! The generators never execute anything. The [`persist`] module wraps a
//! [`rusqlite`] connection behind a synchronous executor that accepts
//! finished text and an optional per-row callback, and
//! [`persist::ingest_row`] materializes textual result rows back into
//! typed column buffers.

pub mod datatype;
pub mod error;
pub mod expr;
pub mod persist;
pub mod table;
