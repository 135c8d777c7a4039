use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool ingests, cleans, or emits tabular data.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a requested worksheet does not exist in the workbook.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when an operation references a column the table does not have.
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// Raised when a table would end up with two columns of the same name.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Raised when a row does not provide one value per column.
    #[error("row has {actual} values but the table has {expected} columns")]
    RowWidth { expected: usize, actual: usize },

    /// Raised when a row position is outside the table.
    #[error("row position {0} is out of bounds")]
    RowOutOfBounds(usize),

    /// Raised when a column position is outside the table.
    #[error("column position {0} is out of bounds")]
    ColumnOutOfBounds(usize),

    /// Raised when a cell cannot be coerced into the requested column type.
    #[error("cannot convert value '{value}' in column {column} to {target}")]
    TypeCoercion {
        column: String,
        value: String,
        target: String,
    },

    /// Raised when a configuration value is outside its accepted range.
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: String, reason: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
