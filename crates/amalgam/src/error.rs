//! Error types for the Amalgam library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Amalgam operations.
#[derive(Debug, Error)]
pub enum AmalgamError {
    /// A manual override referenced something that does not exist.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// An operation was invoked before its inputs were ready.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading a spreadsheet workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Error writing a spreadsheet workbook.
    #[cfg(feature = "spreadsheet")]
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Invalid manual override of keys or relationships.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Table '{0}' not found in loaded tables")]
    UnknownTable(String),

    #[error("Column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Relationship index {index} out of range ({len} relationships)")]
    RelationshipIndexOutOfRange { index: usize, len: usize },
}

/// Merge was requested without the state it needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("No tables loaded")]
    NoTables,

    #[error("No relationships between tables. Add relationships manually before merging.")]
    NoRelationships,
}

impl AmalgamError {
    /// Returns true for errors caused by an invalid manual override.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AmalgamError::Configuration(_))
    }

    /// Returns true for errors caused by calling merge too early.
    pub fn is_precondition(&self) -> bool {
        matches!(self, AmalgamError::Precondition(_))
    }
}

/// Result type alias for Amalgam operations.
pub type Result<T> = std::result::Result<T, AmalgamError>;
