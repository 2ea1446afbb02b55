//! DuckDB database backend implementation.
//!
//! DuckDB resolves concurrent writers optimistically: a competing
//! transaction is not blocked, it fails at write or commit time. Connections
//! cloned from one another therefore share a [`TransactionGate`] that admits
//! one explicit transaction at a time. `begin` waits for the gate, `commit`
//! and `rollback` release it.

use crate::error::{DbError, DbResult};
use crate::traits::{quote_ident, Database};
use bw_core::DbType;
use duckdb::{params_from_iter, Connection};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// How long `begin` waits for another connection's transaction by default
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Admits one transaction at a time across connections to one database
#[derive(Debug, Default)]
struct TransactionGate {
    owner: Mutex<Option<u64>>,
    released: Condvar,
    next_id: AtomicU64,
}

impl TransactionGate {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn acquire(&self, id: u64, timeout: Duration) -> DbResult<()> {
        let owner = self.owner.lock().map_err(poisoned)?;
        let (mut owner, _) = self
            .released
            .wait_timeout_while(owner, timeout, |owner| owner.is_some_and(|o| o != id))
            .map_err(poisoned)?;
        if owner.is_some_and(|o| o != id) {
            return Err(DbError::Locked(format!(
                "another transaction held the database for more than {}ms",
                timeout.as_millis()
            )));
        }
        *owner = Some(id);
        Ok(())
    }

    fn release(&self, id: u64) {
        let Ok(mut owner) = self.owner.lock() else {
            return;
        };
        if *owner == Some(id) {
            *owner = None;
            self.released.notify_all();
        }
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DbError {
    DbError::TransactionError("transaction gate poisoned".to_string())
}

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Connection,
    id: u64,
    gate: Arc<TransactionGate>,
    lock_timeout: Duration,
}

impl DuckDbBackend {
    fn with_gate(conn: Connection) -> Self {
        let gate = Arc::new(TransactionGate::default());
        Self {
            conn,
            id: gate.next_id(),
            gate,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_gate(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::with_gate(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Wait at most `timeout` in `begin` for another connection's transaction.
    /// Clones inherit the timeout.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Open another connection to the same database instance
    pub fn try_clone(&self) -> DbResult<Self> {
        let conn = self
            .conn
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn,
            id: self.gate.next_id(),
            gate: Arc::clone(&self.gate),
            lock_timeout: self.lock_timeout,
        })
    }
}

/// Read a column value as a String, trying multiple DuckDB types.
///
/// DuckDB integer columns do not convert to `String`, so we try
/// String -> i64 -> f64 -> bool.
fn column_as_string(row: &duckdb::Row<'_>, idx: usize) -> Option<String> {
    if let Ok(value) = row.get::<_, Option<String>>(idx) {
        return value;
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return Some(n.to_string());
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return Some(f.to_string());
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return Some(b.to_string());
    }
    None
}

impl Database for DuckDbBackend {
    fn db_type(&self) -> DbType {
        DbType::DuckDb
    }

    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        Ok(self.conn.execute_batch(sql)?)
    }

    fn query_count(&self, sql: &str, params: &[&str]) -> DbResult<i64> {
        let count: i64 = self
            .conn
            .query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count)
    }

    fn query_optional_string(&self, sql: &str, params: &[&str]) -> DbResult<Option<String>> {
        match self
            .conn
            .query_row(sql, params_from_iter(params.iter()), |row| {
                row.get::<_, Option<String>>(0)
            }) {
            Ok(value) => Ok(value),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn query_rows(
        &self,
        sql: &str,
        params: &[&str],
        width: usize,
    ) -> DbResult<Vec<Vec<Option<String>>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows: Vec<Vec<Option<String>>> = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok((0..width)
                    .map(|i| column_as_string(row, i))
                    .collect::<Vec<_>>())
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn current_schema(&self) -> DbResult<String> {
        let schema: String = self
            .conn
            .query_row("SELECT current_schema()", [], |row| row.get(0))?;
        Ok(schema)
    }

    fn relation_exists(&self, schema: &str, table: &str) -> DbResult<bool> {
        let count = self.query_count(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ? AND table_type = 'BASE TABLE'",
            &[schema, table],
        )?;
        Ok(count > 0)
    }

    fn list_tables(&self, schema: &str) -> DbResult<Vec<String>> {
        let rows = self.query_rows(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = ? AND table_type = 'BASE TABLE' ORDER BY table_name",
            &[schema],
            1,
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|mut row| row.pop().flatten())
            .collect())
    }

    fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        let sql = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema));
        Ok(self.conn.execute_batch(&sql)?)
    }

    fn begin(&self) -> DbResult<()> {
        self.gate.acquire(self.id, self.lock_timeout)?;
        self.conn.execute_batch("BEGIN TRANSACTION").map_err(|e| {
            self.gate.release(self.id);
            DbError::from(e)
        })
    }

    fn commit(&self) -> DbResult<()> {
        let result = self.conn.execute_batch("COMMIT");
        self.gate.release(self.id);
        Ok(result?)
    }

    fn rollback(&self) -> DbResult<()> {
        let result = self.conn.execute_batch("ROLLBACK");
        self.gate.release(self.id);
        Ok(result?)
    }
}

impl Drop for DuckDbBackend {
    fn drop(&mut self) {
        // An abandoned transaction is rolled back with the connection.
        self.gate.release(self.id);
    }
}

impl std::fmt::Debug for DuckDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbBackend")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
