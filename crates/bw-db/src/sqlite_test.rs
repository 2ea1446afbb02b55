use super::*;
use crate::traits::with_transaction;
use std::sync::mpsc;
use std::time::Instant;

fn open(dir: &tempfile::TempDir) -> SqliteBackend {
    SqliteBackend::open(&dir.path().join("app.db"), Duration::from_secs(5)).unwrap()
}

#[test]
fn test_open_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    assert_eq!(db.db_type(), DbType::Sqlite);
    assert_eq!(db.current_schema().unwrap(), "main");
    assert!(dir.path().join("app.db").exists());
}

#[test]
fn test_execute_and_query() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    db.execute_batch("CREATE TABLE users (id INTEGER, name TEXT)")
        .unwrap();
    db.execute("INSERT INTO users VALUES (1, ?)", &["Alice"])
        .unwrap();

    assert_eq!(
        db.query_optional_string("SELECT name FROM users", &[])
            .unwrap(),
        Some("Alice".to_string())
    );
    assert_eq!(
        db.query_optional_string("SELECT name FROM users WHERE id = 2", &[])
            .unwrap(),
        None
    );
    assert_eq!(
        db.query_rows("SELECT id, name FROM users", &[], 2).unwrap(),
        vec![vec![Some("1".to_string()), Some("Alice".to_string())]]
    );
}

#[test]
fn test_relation_exists_and_list_tables() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    assert!(!db.relation_exists("main", "b").unwrap());

    db.execute_batch("CREATE TABLE b (id INTEGER); CREATE TABLE a (id INTEGER);")
        .unwrap();

    assert!(db.relation_exists("main", "b").unwrap());
    assert_eq!(db.list_tables("main").unwrap(), vec!["a", "b"]);
}

#[test]
fn test_missing_table_is_classified() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    let err = db.execute("DELETE FROM nowhere", &[]).unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[test]
fn test_transaction_rollback_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    db.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();

    let result = with_transaction(&db, |db| -> DbResult<()> {
        db.execute("INSERT INTO t VALUES (1)", &[])?;
        db.execute("INSERT INTO nowhere VALUES (1)", &[])?;
        Ok(())
    });

    assert!(result.is_err());
    assert_eq!(db.query_count("SELECT COUNT(*) FROM t", &[]).unwrap(), 0);
}

#[test]
fn test_immediate_transactions_serialize_writers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    open(&dir)
        .execute_batch("CREATE TABLE t (v TEXT); INSERT INTO t VALUES ('initial');")
        .unwrap();

    let (locked_tx, locked_rx) = mpsc::channel();
    let holder_path = path.clone();
    let holder = std::thread::spawn(move || {
        let db = SqliteBackend::open(&holder_path, Duration::from_secs(5)).unwrap();
        db.begin().unwrap();
        db.execute("UPDATE t SET v = ?", &["first"]).unwrap();
        locked_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(300));
        let released_at = Instant::now();
        db.commit().unwrap();
        released_at
    });

    locked_rx.recv().unwrap();
    let waiter = SqliteBackend::open(&path, Duration::from_secs(5)).unwrap();
    waiter.begin().unwrap();
    let acquired_at = Instant::now();
    let seen = waiter.query_optional_string("SELECT v FROM t", &[]).unwrap();
    waiter.commit().unwrap();

    let released_at = holder.join().unwrap();
    assert!(acquired_at >= released_at);
    assert_eq!(seen, Some("first".to_string()));
}

#[test]
fn test_busy_timeout_reports_locked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let holder = SqliteBackend::open(&path, Duration::from_secs(5)).unwrap();
    holder.begin().unwrap();

    let impatient = SqliteBackend::open(&path, Duration::from_millis(50)).unwrap();
    let err = impatient.begin().unwrap_err();
    assert!(matches!(err, DbError::Locked(_)));

    holder.rollback().unwrap();
}

#[test]
fn test_create_schema_requires_attached_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    db.create_schema_if_not_exists("main").unwrap();
    assert!(db.create_schema_if_not_exists("ops").is_err());
}
