//! Error types for bw-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Transaction management error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),

    /// Lock could not be acquired (D005)
    #[error("[D005] Database is locked: {0}")]
    Locked(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for catalog or
        // conflict errors, so classify by message.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else if msg.contains("Conflict") || msg.contains("conflict") {
            DbError::Locked(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                DbError::Locked(err.to_string())
            }
            _ => {
                let msg = err.to_string();
                if msg.contains("no such table") {
                    DbError::TableNotFound(msg)
                } else {
                    DbError::ExecutionError(msg)
                }
            }
        }
    }
}
