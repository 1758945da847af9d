// used for the CURRENT_TIMESTAMP sentinel and for taking "now"
use chrono::{DateTime, Utc};

// used to print out readable forms of a data type
use std::fmt;

use crate::error::{Result, SqlGenError};

// ------------- Column type -------------

/// Semantic type of a column. Determines the CREATE TABLE keyword and
/// which native values a column accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Real,
    Datetime,
    Text,
}

impl ColumnType {
    /// The keyword emitted in a column definition.
    pub fn keyword(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Text => "TEXT",
        }
    }

    /// Parses a textual result cell into a value of this type.
    pub fn parse_text(&self, text: &str) -> Result<Value> {
        let parse_error = || SqlGenError::Parse {
            text: text.to_owned(),
            column_type: *self,
        };
        Ok(match self {
            ColumnType::Integer => Value::Integer(text.parse().map_err(|_| parse_error())?),
            ColumnType::Real => Value::Real(text.parse().map_err(|_| parse_error())?),
            ColumnType::Datetime => {
                Value::Datetime(Timestamp(text.parse().map_err(|_| parse_error())?))
            }
            ColumnType::Text => Value::Text(text.to_owned()),
        })
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

// ------------- Column specs -------------

bitflags::bitflags! {
    /// Combinable column specifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ColumnSpec: u8 {
        const PRIMARY_KEY   = 1;
        const AUTOINCREMENT = 2;
        const DEFAULT       = 4;
        const NOT_NULL      = 8;
    }
}

impl ColumnSpec {
    pub fn is_primary_key(&self) -> bool {
        self.contains(ColumnSpec::PRIMARY_KEY)
    }
    pub fn is_autoincrement(&self) -> bool {
        self.contains(ColumnSpec::AUTOINCREMENT)
    }
    pub fn is_not_null(&self) -> bool {
        self.contains(ColumnSpec::NOT_NULL)
    }
    pub fn has_default(&self) -> bool {
        self.contains(ColumnSpec::DEFAULT)
    }
    /// A column that is NOT NULL or carries a DEFAULT must always be able
    /// to produce a concrete value.
    pub fn value_required(&self) -> bool {
        self.is_not_null() || self.has_default()
    }
}

// ------------- Timestamp -------------

/// Seconds since the Unix epoch. The zero value acts as a sentinel that
/// renders as CURRENT_TIMESTAMP when resolved as a column default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp())
    }
}

impl From<i64> for Timestamp {
    fn from(seconds: i64) -> Self {
        Timestamp(seconds)
    }
}
impl From<DateTime<Utc>> for Timestamp {
    fn from(moment: DateTime<Utc>) -> Self {
        Timestamp(moment.timestamp())
    }
}
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ------------- Value -------------

/// A single stored row value, tagged with its semantic column type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Datetime(Timestamp),
    Text(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Integer(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Real,
            Value::Datetime(_) => ColumnType::Datetime,
            Value::Text(_) => ColumnType::Text,
        }
    }

    /// Renders the value without quoting: integers and timestamps in
    /// decimal, reals with exactly six fractional digits, text verbatim.
    pub fn render(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => format!("{r:.6}"),
            Value::Datetime(t) => t.to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    /// Renders the value as a SQL literal: text gets single quotes.
    pub fn sql_literal(&self) -> String {
        match self {
            Value::Text(s) => format!("'{s}'"),
            other => other.render(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(value as i64)
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}
impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(value as f64)
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}
impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Datetime(value)
    }
}
impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Datetime(value.into())
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Implemented by the native types that can live in a typed column. The
/// associated constant fixes the semantic column type at schema-definition
/// time, so an unsupported native type never compiles.
pub trait SqlValue: Into<Value> + Clone {
    const COLUMN_TYPE: ColumnType;
}

impl SqlValue for bool {
    const COLUMN_TYPE: ColumnType = ColumnType::Integer;
}
impl SqlValue for i32 {
    const COLUMN_TYPE: ColumnType = ColumnType::Integer;
}
impl SqlValue for i64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Integer;
}
impl SqlValue for f32 {
    const COLUMN_TYPE: ColumnType = ColumnType::Real;
}
impl SqlValue for f64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Real;
}
impl SqlValue for Timestamp {
    const COLUMN_TYPE: ColumnType = ColumnType::Datetime;
}
impl SqlValue for String {
    const COLUMN_TYPE: ColumnType = ColumnType::Text;
}

// ------------- Default values -------------

/// The resolved default of a column: either NULL or a concrete literal.
/// Used both for the DEFAULT clause in CREATE TABLE and as the fallback
/// when a column is shorter than the longest row buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlDefault {
    value: Option<Value>,
}

impl SqlDefault {
    pub fn null() -> Self {
        SqlDefault { value: None }
    }

    pub fn of(value: Value) -> Self {
        SqlDefault { value: Some(value) }
    }

    /// The zero value of a type, for columns that require a value but
    /// declared no explicit default.
    pub fn zero(column_type: ColumnType) -> Self {
        SqlDefault {
            value: Some(match column_type {
                ColumnType::Integer => Value::Integer(0),
                ColumnType::Real => Value::Real(0.0),
                ColumnType::Datetime => Value::Datetime(Timestamp::EPOCH),
                ColumnType::Text => Value::Text(String::new()),
            }),
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// NULL when absent, CURRENT_TIMESTAMP for the epoch sentinel of a
    /// datetime, otherwise the quoted literal.
    pub fn render(&self) -> String {
        match &self.value {
            None => "NULL".to_owned(),
            Some(Value::Datetime(t)) if *t == Timestamp::EPOCH => "CURRENT_TIMESTAMP".to_owned(),
            Some(value) => value.sql_literal(),
        }
    }
}
