//! Migration history table.
//!
//! One row per applied script (or baseline), ordered by `installed_rank`.
//! All columns except the rank are text so the same DDL works on every
//! backend.

use crate::error::{EngineError, EngineResult};
use crate::version::Version;
use bw_db::{qualified_name, Database, DbResult};

/// How a history row came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationKind {
    /// Versioned SQL script
    Sql,
    /// Baseline marker, no script was executed
    Baseline,
}

impl MigrationKind {
    /// Value stored in the `kind` column
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationKind::Sql => "SQL",
            MigrationKind::Baseline => "BASELINE",
        }
    }

    fn parse(raw: &str) -> EngineResult<Self> {
        match raw {
            "SQL" => Ok(MigrationKind::Sql),
            "BASELINE" => Ok(MigrationKind::Baseline),
            other => Err(EngineError::CorruptHistory(format!(
                "unknown migration kind '{other}'"
            ))),
        }
    }
}

/// A row of the history table
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub installed_rank: i64,
    pub version: Version,
    pub description: String,
    pub script: String,
    pub checksum: String,
    pub installed_on: String,
    pub kind: MigrationKind,
}

/// Handle on the history table of one schema
#[derive(Debug, Clone)]
pub struct HistoryTable {
    schema: String,
    table: String,
}

const COLUMNS: &str = "installed_rank, version, description, script, checksum, installed_on, kind";

impl HistoryTable {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn qualified(&self) -> String {
        qualified_name(&self.schema, &self.table)
    }

    pub fn exists(&self, db: &dyn Database) -> DbResult<bool> {
        db.relation_exists(&self.schema, &self.table)
    }

    /// Create the table (and its schema where the backend supports it)
    pub fn create(&self, db: &dyn Database) -> DbResult<()> {
        db.create_schema_if_not_exists(&self.schema)?;
        db.execute_batch(&format!(
            "CREATE TABLE {} (
                installed_rank INTEGER NOT NULL,
                version        VARCHAR(50) NOT NULL,
                description    VARCHAR(200) NOT NULL,
                script         VARCHAR(1000) NOT NULL,
                checksum       VARCHAR(64),
                installed_on   VARCHAR(40) NOT NULL,
                kind           VARCHAR(20) NOT NULL
            )",
            self.qualified()
        ))?;
        log::info!("Created history table {self}");
        Ok(())
    }

    /// All rows in installation order
    pub fn applied(&self, db: &dyn Database) -> EngineResult<Vec<AppliedMigration>> {
        let rows = db.query_rows(
            &format!(
                "SELECT {COLUMNS} FROM {} ORDER BY installed_rank",
                self.qualified()
            ),
            &[],
            7,
        )?;

        rows.into_iter()
            .map(|row| -> EngineResult<AppliedMigration> {
                let mut cells = row.into_iter().map(Option::unwrap_or_default);
                let mut next = || cells.next().unwrap_or_default();
                let rank = next();
                let installed_rank = rank.parse::<i64>().map_err(|_| {
                    EngineError::CorruptHistory(format!("installed_rank '{rank}' is not a number"))
                })?;
                let version = Version::parse(&next())
                    .map_err(|e| EngineError::CorruptHistory(e.to_string()))?;
                Ok(AppliedMigration {
                    installed_rank,
                    version,
                    description: next(),
                    script: next(),
                    checksum: next(),
                    installed_on: next(),
                    kind: MigrationKind::parse(&next())?,
                })
            })
            .collect()
    }

    /// Highest applied version, baseline included
    pub fn current_version(applied: &[AppliedMigration]) -> Option<Version> {
        applied.iter().map(|m| m.version.clone()).max()
    }

    /// Append a row
    pub fn record(
        &self,
        db: &dyn Database,
        version: &Version,
        description: &str,
        script: &str,
        checksum: Option<&str>,
        kind: MigrationKind,
    ) -> DbResult<()> {
        let rank = db.query_count(
            &format!(
                "SELECT COALESCE(MAX(installed_rank), 0) + 1 FROM {}",
                self.qualified()
            ),
            &[],
        )?;
        let version = version.to_string();
        let installed_on = chrono::Utc::now().to_rfc3339();
        db.execute(
            &format!(
                "INSERT INTO {} ({COLUMNS}) VALUES ({rank}, ?, ?, ?, ?, ?, ?)",
                self.qualified()
            ),
            &[
                version.as_str(),
                description,
                script,
                checksum.unwrap_or_default(),
                installed_on.as_str(),
                kind.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Replace the stored checksum of an applied version
    pub fn update_checksum(&self, db: &dyn Database, version: &Version, checksum: &str) -> DbResult<()> {
        db.execute(
            &format!(
                "UPDATE {} SET checksum = ? WHERE version = ? AND kind = ?",
                self.qualified()
            ),
            &[
                checksum,
                version.to_string().as_str(),
                MigrationKind::Sql.as_str(),
            ],
        )?;
        Ok(())
    }
}

impl std::fmt::Display for HistoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified())
    }
}
