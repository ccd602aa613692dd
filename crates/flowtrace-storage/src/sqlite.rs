//! SQLite implementation of [`FlowTableSource`].
//!
//! [`SqliteFlowTable`] reads the two flow columns of an existing table. The
//! database is opened read-only and the layout is checked once, up front.
//! Individual cells are lenient: NULLs, negative numbers, fractional reals
//! and unparseable text all come through as a missing id.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use flowtrace_core::{FlowRow, ReachId};

use crate::error::StorageError;
use crate::schema::{quote_ident, validate_flow_table};
use crate::traits::FlowTableSource;
use crate::types::{reach_from_f64, reach_from_text, FlowColumns};

/// A flow table stored in SQLite.
pub struct SqliteFlowTable {
    conn: Connection,
    table: String,
    columns: FlowColumns,
}

impl SqliteFlowTable {
    /// Opens the database at `path` read-only and checks the table layout.
    pub fn open(
        path: impl AsRef<Path>,
        table: &str,
        columns: FlowColumns,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!(path = %path.display(), table, "opened flow table database");
        Self::from_connection(conn, table, columns)
    }

    /// Wraps an already open connection and checks the table layout.
    pub fn from_connection(
        conn: Connection,
        table: &str,
        columns: FlowColumns,
    ) -> Result<Self, StorageError> {
        validate_flow_table(&conn, table, &columns)?;
        Ok(SqliteFlowTable {
            conn,
            table: table.to_string(),
            columns,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &FlowColumns {
        &self.columns
    }

    fn select_sql(&self) -> Result<String, StorageError> {
        Ok(format!(
            "SELECT {}, {} FROM {}",
            quote_ident(&self.columns.from)?,
            quote_ident(&self.columns.to)?,
            quote_ident(&self.table)?
        ))
    }
}

impl FlowTableSource for SqliteFlowTable {
    fn describe(&self) -> String {
        format!(
            "sqlite table {} ({}, {})",
            self.table, self.columns.from, self.columns.to
        )
    }

    fn for_each_row(&self, f: &mut dyn FnMut(FlowRow)) -> Result<u64, StorageError> {
        let sql = self.select_sql()?;
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut count = 0u64;
        while let Some(row) = rows.next()? {
            f(FlowRow {
                from: reach_from_cell(row.get_ref(0)?),
                to: reach_from_cell(row.get_ref(1)?),
            });
            count += 1;
        }
        Ok(count)
    }
}

/// Reads a reach id out of one cell.
fn reach_from_cell(value: ValueRef<'_>) -> Option<ReachId> {
    match value {
        ValueRef::Integer(v) => u64::try_from(v).ok().map(ReachId),
        ValueRef::Real(v) => reach_from_f64(v),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok().and_then(reach_from_text),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plusflow(rows: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE PlusFlow (FROMCOMID, TOCOMID);
             INSERT INTO PlusFlow VALUES {rows};"
        ))
        .unwrap();
        conn
    }

    fn read_all(table: &SqliteFlowTable) -> Vec<FlowRow> {
        let mut rows = Vec::new();
        table.for_each_row(&mut |row| rows.push(row)).unwrap();
        rows
    }

    #[test]
    fn reads_integer_rows() {
        let conn = plusflow("(1, 2), (2, 3), (3, 0)");
        let table = SqliteFlowTable::from_connection(conn, "PlusFlow", FlowColumns::default())
            .unwrap();

        assert_eq!(
            read_all(&table),
            vec![
                FlowRow::from((1, 2)),
                FlowRow::from((2, 3)),
                FlowRow::from((3, 0))
            ]
        );
    }

    #[test]
    fn lenient_cells() {
        let conn = plusflow("(NULL, 2), (-4, 2), (5.0, 6.5), ('7', ' 8 '), ('x', X'09')");
        let table = SqliteFlowTable::from_connection(conn, "PlusFlow", FlowColumns::default())
            .unwrap();
        let rows = read_all(&table);

        assert_eq!(rows[0].from, None);
        assert_eq!(rows[1].from, None);
        assert_eq!(rows[2].from, Some(ReachId(5)));
        assert_eq!(rows[2].to, None);
        assert_eq!(rows[3], FlowRow::from((7, 8)));
        assert_eq!(rows[4].from, None);
        assert_eq!(rows[4].to, None);
    }

    #[test]
    fn odd_names_are_quoted() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE \"flow table\" (\"from id\" INTEGER, \"to\" INTEGER);
             INSERT INTO \"flow table\" VALUES (10, 11);",
        )
        .unwrap();

        let table =
            SqliteFlowTable::from_connection(conn, "flow table", FlowColumns::new("from id", "to"))
                .unwrap();
        assert_eq!(read_all(&table), vec![FlowRow::from((10, 11))]);
        assert!(table.describe().contains("flow table"));
    }

    #[test]
    fn missing_table_fails_up_front() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteFlowTable::from_connection(conn, "PlusFlow", FlowColumns::default())
            .err()
            .unwrap();
        assert!(matches!(err, StorageError::TableNotFound { .. }));
    }
}
