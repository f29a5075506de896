use daylog_core::db::{open_db, open_db_in_memory, schema_version, DbError, SCHEMA_VERSION};
use daylog_core::{DocumentRepository, RepoError, SqliteDocumentRepository, DEFAULT_DOCUMENT_KEY};
use rusqlite::Connection;

#[test]
fn fresh_store_is_at_current_schema_and_empty() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);

    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    assert_eq!(repo.load_blob(DEFAULT_DOCUMENT_KEY).unwrap(), None);
    assert_eq!(repo.load_document(DEFAULT_DOCUMENT_KEY).unwrap(), "");
}

#[test]
fn document_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daylog.sqlite3");
    let text = "9.21.2025\n- ran\n";

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
        repo.save_document(DEFAULT_DOCUMENT_KEY, text).unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    assert_eq!(repo.load_document(DEFAULT_DOCUMENT_KEY).unwrap(), text);
}

#[test]
fn saving_twice_keeps_one_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    repo.save_document(DEFAULT_DOCUMENT_KEY, "9.20.2025\n- a").unwrap();
    repo.save_document(DEFAULT_DOCUMENT_KEY, "9.21.2025\n- b").unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_blobs;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(
        repo.load_document(DEFAULT_DOCUMENT_KEY).unwrap(),
        "9.21.2025\n- b"
    );
}

#[test]
fn repository_refuses_unprepared_connection() {
    let raw = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteDocumentRepository::try_new(&raw),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn store_from_newer_build_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 42;")
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 42);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}
