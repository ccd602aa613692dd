//! Storage error types for flowtrace-storage.
//!
//! [`StorageError`] covers everything that can go wrong while reading a flow
//! table. All of it is fatal to a run: without the table there is no index.
//! Bad cell values are not errors; they become malformed rows.

use thiserror::Error;

/// Errors produced by flow-table readers.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON input could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The named table does not exist in the database.
    #[error("flow table not found: {table}")]
    TableNotFound { table: String },

    /// A required column is missing from the flow table.
    #[error("column {column} not found in {table}")]
    ColumnNotFound { table: String, column: String },

    /// A table or column name cannot be used as an SQL identifier.
    #[error("invalid identifier: {name:?}")]
    InvalidIdentifier { name: String },

    /// The input is readable but not shaped like a flow table.
    #[error("invalid flow table layout: {reason}")]
    InvalidLayout { reason: String },
}
