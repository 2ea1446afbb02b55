//! bw-engine - Migration engine for Branchway
//!
//! Defines the [`MigrationEngine`] contract the release coordinator drives,
//! the [`LifecycleEvent`]s an engine reports to its listener, and
//! [`Migrator`], a file-based SQL implementation of the contract.
//!
//! Scripts are named `V<version>__<description>.sql` and live directly in
//! one of the configured locations. Applied scripts are recorded in a
//! history table next to the migrated objects.

pub mod checksum;
pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod migrator;
pub mod script;
pub mod version;

pub use engine::{MigrationEngine, MigrationInfo};
pub use error::{EngineError, EngineResult};
pub use event::{HookError, LifecycleEvent, LifecycleListener, NoopListener};
pub use history::{AppliedMigration, HistoryTable, MigrationKind};
pub use migrator::{Migrator, MigratorSettings};
pub use script::ResolvedScript;
pub use version::Version;
