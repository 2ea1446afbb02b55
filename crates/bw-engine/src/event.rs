//! Lifecycle events reported by a migration engine.
//!
//! An engine delivers every event to a single [`LifecycleListener::on_event`]
//! together with the connection it is working on. A listener error aborts
//! the running operation.

use crate::script::ResolvedScript;
use bw_db::Database;

/// Error returned by a listener; kept boxed so the caller can downcast it
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Extension points fired around each engine phase
#[derive(Debug, Clone, Copy)]
pub enum LifecycleEvent<'a> {
    BeforeClean,
    AfterClean,
    BeforeMigrate,
    AfterMigrate,
    BeforeEachMigrate(&'a ResolvedScript),
    AfterEachMigrate(&'a ResolvedScript),
    BeforeValidate,
    AfterValidate,
    BeforeBaseline,
    AfterBaseline,
    BeforeRepair,
    AfterRepair,
    BeforeInfo,
    AfterInfo,
}

impl LifecycleEvent<'_> {
    /// Stable name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::BeforeClean => "beforeClean",
            LifecycleEvent::AfterClean => "afterClean",
            LifecycleEvent::BeforeMigrate => "beforeMigrate",
            LifecycleEvent::AfterMigrate => "afterMigrate",
            LifecycleEvent::BeforeEachMigrate(_) => "beforeEachMigrate",
            LifecycleEvent::AfterEachMigrate(_) => "afterEachMigrate",
            LifecycleEvent::BeforeValidate => "beforeValidate",
            LifecycleEvent::AfterValidate => "afterValidate",
            LifecycleEvent::BeforeBaseline => "beforeBaseline",
            LifecycleEvent::AfterBaseline => "afterBaseline",
            LifecycleEvent::BeforeRepair => "beforeRepair",
            LifecycleEvent::AfterRepair => "afterRepair",
            LifecycleEvent::BeforeInfo => "beforeInfo",
            LifecycleEvent::AfterInfo => "afterInfo",
        }
    }

    /// Script the event is about, for per-script events
    pub fn script(&self) -> Option<&ResolvedScript> {
        match self {
            LifecycleEvent::BeforeEachMigrate(script)
            | LifecycleEvent::AfterEachMigrate(script) => Some(script),
            _ => None,
        }
    }
}

impl std::fmt::Display for LifecycleEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.script() {
            Some(script) => write!(f, "{}({})", self.name(), script.description),
            None => write!(f, "{}()", self.name()),
        }
    }
}

/// Receives lifecycle events from an engine
pub trait LifecycleListener {
    /// Handle one event; `db` is the connection the engine is using
    fn on_event(&mut self, event: &LifecycleEvent<'_>, db: &dyn Database) -> Result<(), HookError>;
}

/// Listener that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl LifecycleListener for NoopListener {
    fn on_event(&mut self, _event: &LifecycleEvent<'_>, _db: &dyn Database) -> Result<(), HookError> {
        Ok(())
    }
}
