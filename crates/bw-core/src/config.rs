//! Configuration types and parsing for branchway.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main project configuration from branchway.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Base script locations, before any release suffix is applied
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,

    /// Name of the migration history table
    #[serde(default = "default_history_table")]
    pub history_table: String,

    /// Record a baseline instead of failing when the schema already holds
    /// tables but no history table. On by default: the release control
    /// table exists before the first migration runs.
    #[serde(default = "default_true")]
    pub baseline_on_migrate: bool,

    /// Version recorded by a baseline
    #[serde(default = "default_baseline_version")]
    pub baseline_version: String,

    /// Validate applied checksums before every migrate
    #[serde(default = "default_true")]
    pub validate_on_migrate: bool,

    /// Release branching settings
    #[serde(default)]
    pub branching: BranchingConfig,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
    /// SQLite
    Sqlite,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
            DbType::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type (duckdb or sqlite)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file, or `:memory:` for DuckDB)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// How long a SQLite connection waits on a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Release branching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchingConfig {
    /// Name of the control table holding the current release
    #[serde(default = "default_release_table")]
    pub table: String,

    /// Schema owning the control table (default: the connection's current schema)
    #[serde(default)]
    pub schema: Option<String>,

    /// Release seeded into a freshly created control table
    #[serde(default = "default_release")]
    pub default_release: String,

    /// Upper bound on migration passes within one `migrate`
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,

    /// External DDL template replacing the embedded one for the dialect
    #[serde(default)]
    pub ddl_template: Option<PathBuf>,
}

impl Default for BranchingConfig {
    fn default() -> Self {
        Self {
            table: default_release_table(),
            schema: None,
            default_release: default_release(),
            max_passes: default_max_passes(),
            ddl_template: None,
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_locations() -> Vec<String> {
    vec!["db/migrations".to_string()]
}

fn default_history_table() -> String {
    "schema_version".to_string()
}

fn default_baseline_version() -> String {
    "0".to_string()
}

fn default_release_table() -> String {
    "releasetable".to_string()
}

fn default_release() -> String {
    "main".to_string()
}

fn default_max_passes() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            locations: default_locations(),
            history_table: default_history_table(),
            baseline_on_migrate: true,
            baseline_version: default_baseline_version(),
            validate_on_migrate: true,
            branching: BranchingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for branchway.yml or branchway.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("branchway.yml");
        let yaml_path = dir.join("branchway.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.locations.is_empty() {
            return Err(invalid("At least one location must be specified"));
        }
        if let Some(empty) = self.locations.iter().position(|l| l.trim().is_empty()) {
            return Err(invalid(format!("Location #{} is empty", empty + 1)));
        }
        if self.history_table.trim().is_empty() {
            return Err(invalid("history_table cannot be empty"));
        }
        if self.branching.table.trim().is_empty() {
            return Err(invalid("branching.table cannot be empty"));
        }
        if self.branching.table == self.history_table {
            return Err(invalid(format!(
                "branching.table and history_table must differ (both are '{}')",
                self.history_table
            )));
        }
        if self.branching.max_passes == 0 {
            return Err(invalid("branching.max_passes must be at least 1"));
        }

        let release = &self.branching.default_release;
        if release.is_empty() || release.contains(['/', '\'']) {
            return Err(invalid(format!(
                "branching.default_release '{release}' must be non-empty and contain neither '/' nor quotes"
            )));
        }

        if self.database.db_type == DbType::Sqlite && self.database.path == DEFAULT_DB_PATH {
            return Err(invalid(
                "SQLite databases need a file path; ':memory:' is only supported for duckdb",
            ));
        }

        Ok(())
    }

    /// Resolve the database path against a project root (`:memory:` is kept as-is)
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.path == DEFAULT_DB_PATH {
            return self.database.path.clone();
        }
        root.join(&self.database.path).display().to_string()
    }
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::ConfigInvalid {
        message: message.into(),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
