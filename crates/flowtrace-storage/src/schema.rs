//! Identifier quoting and layout checks for SQLite flow tables.
//!
//! The flow table belongs to someone else, so nothing here creates or
//! migrates anything. Before a read, the table and both flow columns must
//! exist; SQLite matches names case-insensitively, and so do these checks.

use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::types::FlowColumns;

/// Quotes `name` as an SQL identifier, doubling embedded quotes.
///
/// Names containing NUL cannot be expressed in SQL and are rejected.
pub fn quote_ident(name: &str) -> Result<String, StorageError> {
    if name.is_empty() || name.contains('\0') {
        return Err(StorageError::InvalidIdentifier {
            name: name.to_string(),
        });
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Returns `true` if a table or view named `table` exists.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, StorageError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master \
         WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE)",
        params![table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Column names of `table`, in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, StorageError> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table)?);
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Checks that `table` exists and carries both flow columns.
pub fn validate_flow_table(
    conn: &Connection,
    table: &str,
    columns: &FlowColumns,
) -> Result<(), StorageError> {
    quote_ident(table)?;
    quote_ident(&columns.from)?;
    quote_ident(&columns.to)?;

    if !table_exists(conn, table)? {
        return Err(StorageError::TableNotFound {
            table: table.to_string(),
        });
    }

    let present = table_columns(conn, table)?;
    for required in [&columns.from, &columns.to] {
        if !present.iter().any(|c| c.eq_ignore_ascii_case(required)) {
            return Err(StorageError::ColumnNotFound {
                table: table.to_string(),
                column: required.clone(),
            });
        }
    }
    Ok(())
}
