use super::*;

#[test]
fn create_table_and_view() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_table_as("t1", "SELECT 1 AS id, 'x' AS name").unwrap();
    db.create_view_as("v1", "SELECT id FROM t1").unwrap();

    assert!(db.relation_exists("t1").unwrap());
    assert!(db.relation_exists("v1").unwrap());
    assert!(!db.relation_exists("nope").unwrap());
    assert_eq!(db.query_count("SELECT * FROM v1").unwrap(), 1);
}

#[test]
fn create_or_replace_supersedes_old_data() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_table_as("t", "SELECT * FROM range(10)").unwrap();
    assert_eq!(db.query_count("SELECT * FROM t").unwrap(), 10);

    db.create_table_as("t", "SELECT * FROM range(3)").unwrap();
    assert_eq!(db.query_count("SELECT * FROM t").unwrap(), 3);
}

#[test]
fn drop_if_exists_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_table_as("gone", "SELECT 1 AS id").unwrap();
    db.drop_if_exists("gone").unwrap();
    db.drop_if_exists("gone").unwrap();
    assert!(!db.relation_exists("gone").unwrap());
}

#[test]
fn query_i64_scalar() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.query_i64("SELECT 41 + 1").unwrap(), 42);
}

#[test]
fn file_database_roundtrip_and_read_only() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested/dir/enem.duckdb");

    {
        let db = DuckDbBackend::open(&path).unwrap();
        db.create_table_as("t", "SELECT 7 AS n").unwrap();
    }

    let reader = DuckDbBackend::open_read_only(&path).unwrap();
    assert_eq!(reader.query_i64("SELECT n FROM t").unwrap(), 7);
    // read-only connections cannot create tables
    assert!(reader.create_table_as("t2", "SELECT 1").is_err());
}

#[test]
fn execution_error_carries_sql_context() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.execute("SELECT FROM nowhere !!").unwrap_err();
    match err {
        DbError::ExecutionError(msg) => assert!(msg.contains("SELECT FROM nowhere")),
        other => panic!("unexpected error {other:?}"),
    }
}
