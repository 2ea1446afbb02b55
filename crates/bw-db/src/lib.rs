//! bw-db - Database abstraction layer for Branchway
//!
//! This crate provides the synchronous [`Database`] trait, DuckDB and SQLite
//! implementations of it, and a [`DataSource`] that hands out connections.

pub mod datasource;
pub mod duckdb;
pub mod error;
pub mod sqlite;
pub mod traits;

pub use datasource::DataSource;
pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use sqlite::SqliteBackend;
pub use traits::{qualified_name, quote_ident, with_transaction, Database};
