//! Connection factory.
//!
//! A [`DataSource`] is the one place connections come from. DuckDB
//! connections are clones of a root connection, so `:memory:` databases and
//! the transaction gate are shared by every connection handed out; SQLite
//! connections are opened fresh against the database file. The busy timeout
//! bounds how long a transaction waits for a competing one on either backend.

use crate::duckdb::DuckDbBackend;
use crate::error::DbResult;
use crate::sqlite::SqliteBackend;
use crate::traits::Database;
use bw_core::{DatabaseConfig, DbType};
use std::path::PathBuf;
use std::time::Duration;

/// Hands out connections to one database
pub enum DataSource {
    /// DuckDB database, kept alive by its root connection
    DuckDb {
        /// Root connection that later connections are cloned from
        root: DuckDbBackend,
    },
    /// SQLite database file
    Sqlite {
        /// Database file
        path: PathBuf,
        /// Busy timeout applied to every connection
        busy_timeout: Duration,
    },
}

impl DataSource {
    /// Open a data source for `path` with the given backend
    pub fn open(db_type: DbType, path: &str, busy_timeout: Duration) -> DbResult<Self> {
        match db_type {
            DbType::DuckDb => Ok(DataSource::DuckDb {
                root: DuckDbBackend::new(path)?.with_lock_timeout(busy_timeout),
            }),
            DbType::Sqlite => {
                let source = DataSource::Sqlite {
                    path: PathBuf::from(path),
                    busy_timeout,
                };
                // Fail at open time rather than on first use.
                drop(source.connect()?);
                Ok(source)
            }
        }
    }

    /// Open a data source from configuration, using `path` as the resolved
    /// database location
    pub fn from_config(config: &DatabaseConfig, path: &str) -> DbResult<Self> {
        Self::open(
            config.db_type,
            path,
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    /// Acquire a new connection
    pub fn connect(&self) -> DbResult<Box<dyn Database>> {
        match self {
            DataSource::DuckDb { root } => Ok(Box::new(root.try_clone()?)),
            DataSource::Sqlite { path, busy_timeout } => {
                Ok(Box::new(SqliteBackend::open(path, *busy_timeout)?))
            }
        }
    }

    /// Backend of every connection this source hands out
    pub fn db_type(&self) -> DbType {
        match self {
            DataSource::DuckDb { .. } => DbType::DuckDb,
            DataSource::Sqlite { .. } => DbType::Sqlite,
        }
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::DuckDb { .. } => f.debug_struct("DataSource::DuckDb").finish(),
            DataSource::Sqlite { path, .. } => f
                .debug_struct("DataSource::Sqlite")
                .field("path", path)
                .finish(),
        }
    }
}

#[cfg(test)]
#[path = "datasource_test.rs"]
mod tests;
