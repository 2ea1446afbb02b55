//! The contract a release coordinator drives.

use crate::error::EngineResult;
use crate::event::LifecycleListener;
use crate::history::AppliedMigration;
use crate::script::ResolvedScript;
use crate::version::Version;
use bw_db::{Database, DbResult};

/// Snapshot returned by [`MigrationEngine::info`]
#[derive(Debug, Clone, Default)]
pub struct MigrationInfo {
    /// History rows in installation order
    pub applied: Vec<AppliedMigration>,
    /// Resolved scripts above the current version, in version order
    pub pending: Vec<ResolvedScript>,
    /// Highest applied version, if any
    pub current: Option<Version>,
}

impl MigrationInfo {
    /// Version string for display, `<< Empty Schema >>` when nothing is applied
    pub fn current_display(&self) -> String {
        self.current
            .as_ref()
            .map(Version::to_string)
            .unwrap_or_else(|| "<< Empty Schema >>".to_string())
    }
}

/// A migration engine with mutable script locations.
///
/// Every operation reports its lifecycle events to `listener`, passing the
/// connection the engine works on. A listener error aborts the operation.
pub trait MigrationEngine {
    /// Currently configured script locations
    fn locations(&self) -> &[String];

    /// Replace the script locations used by subsequent operations
    fn set_locations(&mut self, locations: Vec<String>);

    /// Acquire a connection to the target database
    fn connect(&self) -> DbResult<Box<dyn Database>>;

    /// Apply every pending script, returns the number applied
    fn migrate(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<usize>;

    /// Describe applied and pending migrations
    fn info(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<MigrationInfo>;

    /// Check applied scripts against the resolved ones
    fn validate(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<()>;

    /// Drop every table in the target schema, returns the number dropped
    fn clean(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<usize>;

    /// Record a baseline in an empty history
    fn baseline(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<()>;

    /// Realign stored checksums, returns the number of rows updated
    fn repair(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<usize>;
}
