//! Error types for release branching.

use bw_db::DbError;
use bw_engine::EngineError;
use thiserror::Error;

/// Release branching errors
#[derive(Error, Debug)]
pub enum BranchError {
    /// Reading, writing, creating or locking the control table failed (B001)
    #[error("[B001] Release table {table}: {action} failed: {source}")]
    Storage {
        table: String,
        action: &'static str,
        #[source]
        source: DbError,
    },

    /// Invalid locations, release identifier, DDL template or pass limit (B002)
    #[error("[B002] Branching configuration error: {0}")]
    Configuration(String),

    /// No connection could be obtained from the engine's data source (B003)
    #[error("[B003] Could not acquire a connection to {purpose}: {source}")]
    ConnectionAcquisition {
        purpose: &'static str,
        #[source]
        source: DbError,
    },

    /// The engine failed during a coordinated pass (B004)
    #[error("[B004] {0}")]
    Engine(#[source] EngineError),

    /// Opening or finishing the transaction around a control table access failed (B005)
    #[error("[B005] Release transaction failed: {0}")]
    Transaction(#[from] DbError),
}

/// Result type alias for [`BranchError`].
pub type BranchResult<T> = Result<T, BranchError>;

/// Engine errors raised by the coordinator's own listener carry a
/// [`BranchError`]; unwrap those so callers see the original kind.
impl From<EngineError> for BranchError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Hook { event, source } => match source.downcast::<BranchError>() {
                Ok(branch) => *branch,
                Err(source) => BranchError::Engine(EngineError::Hook { event, source }),
            },
            other => BranchError::Engine(other),
        }
    }
}
