//! Error types for the migration engine.

use crate::event::HookError;
use bw_db::DbError;
use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A connection could not be obtained from the data source (G001)
    #[error("[G001] Could not acquire a database connection: {0}")]
    Connection(#[source] DbError),

    /// Database error outside of script execution (G002)
    #[error("[G002] Migration database operation failed: {0}")]
    Database(#[from] DbError),

    /// Reading a script location failed (G003)
    #[error("[G003] Cannot read migration scripts at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Version string could not be parsed (G004)
    #[error("[G004] Invalid migration version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A `V…` script does not follow `V<version>__<description>.sql` (G005)
    #[error("[G005] Invalid migration script name '{script}': expected V<version>__<description>.sql")]
    InvalidScriptName { script: String },

    /// Two resolved scripts share a version (G006)
    #[error("[G006] Found more than one migration with version {version}: {first} and {second}")]
    DuplicateVersion {
        version: String,
        first: String,
        second: String,
    },

    /// A script failed to execute; its transaction was rolled back (G007)
    #[error("[G007] Migration {script} failed: {source}")]
    ScriptFailed {
        script: String,
        #[source]
        source: DbError,
    },

    /// An applied script changed on disk (G008)
    #[error("[G008] Checksum mismatch for migration version {version}: applied {applied}, resolved {resolved}")]
    ChecksumMismatch {
        version: String,
        applied: String,
        resolved: String,
    },

    /// Schema holds tables but has no history table and baselining is off (G009)
    #[error("[G009] Found non-empty schema '{schema}' ({tables}) without history table. Run baseline or enable baseline_on_migrate")]
    NonEmptySchema { schema: String, tables: String },

    /// Baseline requested for a schema that already has history (G010)
    #[error("[G010] Cannot baseline: history table {table} already contains migrations")]
    HistoryNotEmpty { table: String },

    /// History table row could not be interpreted (G011)
    #[error("[G011] Corrupt migration history: {0}")]
    CorruptHistory(String),

    /// A lifecycle listener aborted the operation (G012)
    #[error("[G012] Lifecycle hook {event} failed: {source}")]
    Hook {
        event: &'static str,
        #[source]
        source: HookError,
    },
}

/// Result type alias for [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
