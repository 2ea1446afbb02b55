//! The release control table.
//!
//! A single-row, single-column table holding the release the database is
//! on. Every accessor creates the table first if needed, so the table
//! bootstraps itself on first use. All operations run on the caller's
//! connection and inside the caller's transaction, if any.

use crate::ddl;
use crate::error::{BranchError, BranchResult};
use bw_core::{BranchingConfig, DbType};
use bw_db::{qualified_name, Database, DbError};
use std::path::Path;

const RELEASE_COLUMN: &str = "\"CURRENT_RELEASE\"";

/// Identity of a control table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTable {
    pub schema: String,
    pub table: String,
}

impl ReleaseTable {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    fn qualified(&self) -> String {
        qualified_name(&self.schema, &self.table)
    }
}

impl std::fmt::Display for ReleaseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Durable, lockable store for the current release
#[derive(Debug, Clone)]
pub struct ReleaseStore {
    table: ReleaseTable,
    default_release: String,
    dialect: DbType,
    create_ddl: String,
}

impl ReleaseStore {
    /// Store using the embedded DDL template for `dialect`
    pub fn new(
        table: ReleaseTable,
        default_release: impl Into<String>,
        dialect: DbType,
    ) -> BranchResult<Self> {
        Self::with_template(table, default_release, dialect, ddl::embedded_template(dialect))
    }

    /// Store creating its table from a custom DDL template.
    ///
    /// The template is rendered here, so unresolved placeholders surface
    /// before the database is touched.
    pub fn with_template(
        table: ReleaseTable,
        default_release: impl Into<String>,
        dialect: DbType,
        template: &str,
    ) -> BranchResult<Self> {
        let default_release = default_release.into();
        let create_ddl = ddl::render(
            template,
            &[
                (ddl::SCHEMA_NAME, table.schema.as_str()),
                (ddl::TABLE_NAME, table.table.as_str()),
                (ddl::DEFAULT_RELEASE, default_release.as_str()),
            ],
        )?;
        Ok(Self {
            table,
            default_release,
            dialect,
            create_ddl,
        })
    }

    /// Build a store from configuration for the database behind `db`.
    ///
    /// The schema defaults to the connection's current schema and the
    /// dialect follows the connection. A relative `ddl_template` is
    /// resolved against `project_dir`.
    pub fn from_config(
        config: &BranchingConfig,
        db: &dyn Database,
        project_dir: &Path,
    ) -> BranchResult<Self> {
        let schema = match &config.schema {
            Some(schema) => schema.clone(),
            None => db.current_schema().map_err(|source| BranchError::Storage {
                table: config.table.clone(),
                action: "resolve schema",
                source,
            })?,
        };
        let table = ReleaseTable::new(schema, config.table.as_str());
        let dialect = db.db_type();

        match &config.ddl_template {
            Some(path) => {
                let template = ddl::load_template(&project_dir.join(path))?;
                Self::with_template(table, config.default_release.as_str(), dialect, &template)
            }
            None => Self::new(table, config.default_release.as_str(), dialect),
        }
    }

    pub fn table(&self) -> &ReleaseTable {
        &self.table
    }

    pub fn default_release(&self) -> &str {
        &self.default_release
    }

    fn storage(&self, action: &'static str) -> impl FnOnce(DbError) -> BranchError + '_ {
        move |source| BranchError::Storage {
            table: self.table.to_string(),
            action,
            source,
        }
    }

    fn check_dialect(&self, db: &dyn Database) -> BranchResult<()> {
        if db.db_type() != self.dialect {
            return Err(BranchError::Configuration(format!(
                "release table {} was set up for {} but the connection is {}",
                self.table,
                self.dialect,
                db.db_type()
            )));
        }
        Ok(())
    }

    /// Create and seed the table unless it already exists
    pub fn ensure_exists(&self, db: &dyn Database) -> BranchResult<()> {
        self.check_dialect(db)?;
        let exists = db
            .relation_exists(&self.table.schema, &self.table.table)
            .map_err(self.storage("check existence"))?;
        if exists {
            return Ok(());
        }

        db.execute_batch(&self.create_ddl)
            .map_err(self.storage("create"))?;
        log::info!(
            "Created release table {} with release '{}'",
            self.table,
            self.default_release
        );
        Ok(())
    }

    /// Take the row lock until the caller's transaction ends.
    ///
    /// Issues a no-op update. Only meaningful inside a transaction: on SQLite
    /// the write lock comes from `BEGIN IMMEDIATE`, on DuckDB from the
    /// connection's transaction gate.
    pub fn lock(&self, db: &dyn Database) -> BranchResult<()> {
        self.ensure_exists(db)?;
        db.execute(
            &format!(
                "UPDATE {} SET {RELEASE_COLUMN} = {RELEASE_COLUMN}",
                self.table.qualified()
            ),
            &[],
        )
        .map_err(self.storage("lock"))?;
        log::debug!("Locked release table {}", self.table);
        Ok(())
    }

    /// Read the stored release
    pub fn current_release(&self, db: &dyn Database) -> BranchResult<String> {
        self.ensure_exists(db)?;
        let release = db
            .query_optional_string(
                &format!(
                    "SELECT {RELEASE_COLUMN} FROM {} LIMIT 1",
                    self.table.qualified()
                ),
                &[],
            )
            .map_err(self.storage("read"))?;

        release.ok_or_else(|| {
            self.storage("read")(DbError::ExecutionError(
                "table holds no release row".to_string(),
            ))
        })
    }

    /// Overwrite the stored release. The value is not validated here.
    pub fn set_current_release(&self, db: &dyn Database, release: &str) -> BranchResult<()> {
        self.ensure_exists(db)?;
        db.execute(
            &format!(
                "UPDATE {} SET {RELEASE_COLUMN} = ?",
                self.table.qualified()
            ),
            &[release],
        )
        .map_err(self.storage("write"))?;
        log::info!("Release in {} set to '{release}'", self.table);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
