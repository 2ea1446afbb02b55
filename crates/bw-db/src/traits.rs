//! Database trait definition

use crate::error::{DbError, DbResult};
use bw_core::DbType;

/// Synchronous connection abstraction shared by the migration engine and the
/// release store.
///
/// Every method runs on the calling thread and blocks on the database.
/// Parameters are bound positionally as text.
pub trait Database {
    /// Backend identifier, also used to select dialect-specific SQL
    fn db_type(&self) -> DbType;

    /// Execute a single statement, returns affected rows
    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Execute multiple statements without parameters
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query whose first column of the first row is an integer
    fn query_count(&self, sql: &str, params: &[&str]) -> DbResult<i64>;

    /// Read the first column of the first row as text, `None` when no row matches
    fn query_optional_string(&self, sql: &str, params: &[&str]) -> DbResult<Option<String>>;

    /// Read the first `width` columns of every row as text
    fn query_rows(
        &self,
        sql: &str,
        params: &[&str],
        width: usize,
    ) -> DbResult<Vec<Vec<Option<String>>>>;

    /// Name of the schema unqualified names resolve to
    fn current_schema(&self) -> DbResult<String>;

    /// Check whether a base table exists in `schema`
    fn relation_exists(&self, schema: &str, table: &str) -> DbResult<bool>;

    /// List base tables in `schema`, sorted by name
    fn list_tables(&self, schema: &str) -> DbResult<Vec<String>>;

    /// Create a schema if it does not exist
    fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;

    /// Open a transaction.
    ///
    /// Waits while another connection to the same database holds a
    /// transaction, failing with [`DbError::Locked`] after the backend's
    /// timeout.
    fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    fn rollback(&self) -> DbResult<()>;
}

/// Execute `body` within a transaction, committing on success and rolling
/// back on error.
pub fn with_transaction<T, E, F>(db: &dyn Database, body: F) -> Result<T, E>
where
    F: FnOnce(&dyn Database) -> Result<T, E>,
    E: From<DbError>,
{
    db.begin()
        .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

    let result = body(db);

    match &result {
        Ok(_) => {
            if let Err(commit_err) = db.commit() {
                if let Err(rollback_err) = db.rollback() {
                    log::warn!("ROLLBACK after failed COMMIT failed: {rollback_err}");
                }
                return Err(
                    DbError::TransactionError(format!("COMMIT failed: {commit_err}")).into(),
                );
            }
        }
        Err(_) => {
            if let Err(rollback_err) = db.rollback() {
                log::warn!("ROLLBACK failed: {rollback_err}");
            }
        }
    }
    result
}

/// Quote an identifier with double quotes, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a quoted `schema.table` reference
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

#[cfg(test)]
#[path = "traits_test.rs"]
mod tests;
