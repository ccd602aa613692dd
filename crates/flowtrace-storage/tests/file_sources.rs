//! On-disk flow tables loaded end to end.

use std::fs;

use rusqlite::Connection;

use flowtrace_core::ReachId;
use flowtrace_storage::{
    load_flow_graph, FlowColumns, FlowTableSource, JsonFlowTable, SqliteFlowTable, StorageError,
};

fn write_plusflow(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE PlusFlow (FROMCOMID INTEGER, TOCOMID INTEGER);
         INSERT INTO PlusFlow VALUES (0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (NULL, 4), (2, 3);",
    )
    .unwrap();
}

#[test]
fn sqlite_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nhd.sqlite");
    write_plusflow(&path);

    let table = SqliteFlowTable::open(&path, "PlusFlow", FlowColumns::default()).unwrap();
    let graph = load_flow_graph(&table, ReachId::TERMINAL).unwrap();

    assert_eq!(graph.edge_count(), 4);
    assert!(graph.contains_edge(ReachId(3), ReachId(4)));
    assert!(graph.contains_edge(ReachId::TERMINAL, ReachId(1)));
    let stats = graph.stats();
    assert_eq!(stats.rows_read, 7);
    assert_eq!(stats.terminal_rows, 1);
    assert_eq!(stats.skipped_rows, 1);
    assert_eq!(stats.duplicate_edges, 1);
}

#[test]
fn sqlite_file_is_opened_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nhd.sqlite");
    write_plusflow(&path);

    let table = SqliteFlowTable::open(&path, "PlusFlow", FlowColumns::default()).unwrap();
    let mut count = 0;
    table.for_each_row(&mut |_| count += 1).unwrap();
    assert_eq!(count, 7);

    // The source database is unchanged after reading.
    let conn = Connection::open(&path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM PlusFlow", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 7);
}

#[test]
fn sqlite_missing_columns_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nhd.sqlite");
    write_plusflow(&path);

    let err = SqliteFlowTable::open(&path, "PlusFlow", FlowColumns::new("FROMCOMID", "DNHYDROSEQ"))
        .err()
        .unwrap();
    assert!(matches!(err, StorageError::ColumnNotFound { .. }));
    assert!(err.to_string().contains("DNHYDROSEQ"));
}

#[test]
fn sqlite_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = SqliteFlowTable::open(dir.path().join("absent.sqlite"), "PlusFlow", FlowColumns::default())
        .err()
        .unwrap();
    assert!(matches!(err, StorageError::Sqlite(_)));
}

#[test]
fn json_file_matches_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite_path = dir.path().join("nhd.sqlite");
    write_plusflow(&sqlite_path);
    let json_path = dir.path().join("plusflow.json");
    fs::write(
        &json_path,
        r#"[
            {"FROMCOMID": 0, "TOCOMID": 1},
            {"FROMCOMID": 1, "TOCOMID": 2},
            {"FROMCOMID": 2, "TOCOMID": 3},
            {"FROMCOMID": 3, "TOCOMID": 4},
            {"FROMCOMID": 4, "TOCOMID": 0},
            {"FROMCOMID": null, "TOCOMID": 4},
            {"FROMCOMID": 2, "TOCOMID": 3}
        ]"#,
    )
    .unwrap();

    let from_sqlite = load_flow_graph(
        &SqliteFlowTable::open(&sqlite_path, "PlusFlow", FlowColumns::default()).unwrap(),
        ReachId::TERMINAL,
    )
    .unwrap();
    let from_json = load_flow_graph(
        &JsonFlowTable::open(&json_path, FlowColumns::default()).unwrap(),
        ReachId::TERMINAL,
    )
    .unwrap();

    let mut a: Vec<_> = from_sqlite.edges().collect();
    let mut b: Vec<_> = from_json.edges().collect();
    a.sort();
    b.sort();
    assert_eq!(a, b);
    assert_eq!(from_sqlite.stats(), from_json.stats());
}

#[test]
fn json_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = JsonFlowTable::open(dir.path().join("absent.json"), FlowColumns::default()).unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
}
