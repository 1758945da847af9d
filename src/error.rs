
use thiserror::Error;

use crate::datatype::ColumnType;

#[derive(Error, Debug)]
pub enum SqlGenError {
    #[error("count of values ({actual}) is not equal to count of table columns ({expected})")]
    ValueCount { expected: usize, actual: usize },
    #[error(
        "type of value under index {index} ({actual}) is not equal to type of column with same index in table ({expected})"
    )]
    ValueType {
        index: usize,
        expected: ColumnType,
        actual: ColumnType,
    },
    #[error("could not parse '{text}' as a {column_type} value")]
    Parse {
        text: String,
        column_type: ColumnType,
    },
    #[error("execution error: {0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, SqlGenError>;

// Helper conversions
impl From<rusqlite::Error> for SqlGenError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Execution(e.to_string())
    }
}
