//! SQLite database backend implementation using rusqlite.
//!
//! Transactions open with `BEGIN IMMEDIATE`, so the write lock is taken up
//! front and a competing writer waits for up to the busy timeout instead of
//! failing halfway through its transaction.

use crate::error::{DbError, DbResult};
use crate::traits::{quote_ident, Database};
use bw_core::DbType;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::time::Duration;

/// SQLite database backend
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) a SQLite database file, waiting up to `busy_timeout`
    /// whenever another connection holds the write lock
    pub fn open(path: &Path, busy_timeout: Duration) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        conn.busy_timeout(busy_timeout)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }
}

/// Read a column value as a String.
///
/// SQLite INTEGER/REAL values do not convert to `String`, so we try
/// String -> i64 -> f64.
fn column_as_string(row: &rusqlite::Row<'_>, idx: usize) -> Option<String> {
    if let Ok(value) = row.get::<_, Option<String>>(idx) {
        return value;
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return Some(n.to_string());
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return Some(f.to_string());
    }
    None
}

impl Database for SqliteBackend {
    fn db_type(&self) -> DbType {
        DbType::Sqlite
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
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
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
        Ok("main".to_string())
    }

    fn relation_exists(&self, schema: &str, table: &str) -> DbResult<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}.sqlite_master WHERE type = 'table' AND name = ?",
            quote_ident(schema)
        );
        Ok(self.query_count(&sql, &[table])? > 0)
    }

    fn list_tables(&self, schema: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT name FROM {}.sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            quote_ident(schema)
        );
        let rows = self.query_rows(&sql, &[], 1)?;
        Ok(rows
            .into_iter()
            .filter_map(|mut row| row.pop().flatten())
            .collect())
    }

    fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        // SQLite schemas are attached databases; they cannot be created here.
        let attached = self.query_count(
            "SELECT COUNT(*) FROM pragma_database_list WHERE name = ?",
            &[schema],
        )?;
        if attached == 0 {
            return Err(DbError::ExecutionError(format!(
                "SQLite schema '{schema}' is not attached to this connection"
            )));
        }
        Ok(())
    }

    fn begin(&self) -> DbResult<()> {
        Ok(self.conn.execute_batch("BEGIN IMMEDIATE")?)
    }

    fn commit(&self) -> DbResult<()> {
        Ok(self.conn.execute_batch("COMMIT")?)
    }

    fn rollback(&self) -> DbResult<()> {
        Ok(self.conn.execute_batch("ROLLBACK")?)
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
