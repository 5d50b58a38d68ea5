use notesync_core::db::migrations::latest_version;
use notesync_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("in-memory db should open");

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes");
    assert_table_exists(&conn, "session");
}

#[test]
fn reopening_a_file_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("notesync.db");

    let conn = open_db(&path).expect("first open");
    conn.execute(
        "INSERT INTO notes (id, title, timestamp) VALUES ('n1', 'kept', 1);",
        [],
    )
    .expect("insert note");
    drop(conn);

    let conn = open_db(&path).expect("second open");
    assert_eq!(schema_version(&conn), latest_version());
    let title: String = conn
        .query_row("SELECT title FROM notes WHERE id = 'n1';", [], |row| {
            row.get(0)
        })
        .expect("row survives reopen");
    assert_eq!(title, "kept");
}

#[test]
fn flag_columns_reject_values_other_than_zero_or_one() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let result = conn.execute(
        "INSERT INTO notes (id, timestamp, locked) VALUES ('bad', 1, 2);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).expect("raw open");
    conn.execute_batch("PRAGMA user_version = 999;")
        .expect("bump version");
    drop(conn);

    match open_db(&path).expect_err("future schema must be rejected") {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("read user_version")
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .expect("query sqlite_master");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
