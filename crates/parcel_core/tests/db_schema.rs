use parcel_core::db::schema::{apply_schema, current_version, latest_version};
use parcel_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_parcel_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    assert_eq!(
        parcel_columns(&conn),
        vec!["number", "client", "status", "address", "created_at"]
    );
}

#[test]
fn apply_schema_twice_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO parcel (client, status, address, created_at)
         VALUES (1, 'registered', 'kept', '2024-01-01T00:00:00Z');",
        [],
    )
    .unwrap();

    apply_schema(&mut conn).unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM parcel;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn reopening_file_database_keeps_version_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (7, 'sent', 'somewhere', '2024-01-01T00:00:00Z');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(current_version(&second).unwrap(), latest_version());
    let client: i64 = second
        .query_row("SELECT client FROM parcel;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(client, 7);
}

#[test]
fn opening_database_with_newer_schema_version_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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

#[test]
fn open_db_in_unwritable_location_surfaces_sqlite_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("tracker.db");

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
}

fn parcel_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('parcel') ORDER BY cid;")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}
