//! Keeps a migration engine's locations on the stored release.
//!
//! At construction the coordinator reads the release inside a transaction
//! and points every engine location at it. Each `migrate` then runs passes
//! until the release observed after a pass matches the one the pass ran
//! with, switching locations in between, up to a fixed number of passes.

use crate::error::{BranchError, BranchResult};
use crate::locations::compute_locations;
use crate::store::ReleaseStore;
use bw_core::BranchingConfig;
use bw_db::{with_transaction, Database};
use bw_engine::{HookError, LifecycleEvent, LifecycleListener, MigrationEngine, MigrationInfo};
use std::path::Path;

/// Outcome of [`BranchCoordinator::migrate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Scripts applied across all passes
    pub applied: usize,
    /// Migration passes run
    pub passes: usize,
    /// Release the locations point at afterwards
    pub release: String,
}

/// Listener half of the coordinator: tracks the release the current
/// locations were computed for and records what the store says after a
/// migration pass.
#[derive(Debug)]
struct ReleaseTracker {
    store: ReleaseStore,
    current: String,
    observed: Option<String>,
}

impl LifecycleListener for ReleaseTracker {
    fn on_event(&mut self, event: &LifecycleEvent<'_>, db: &dyn Database) -> Result<(), HookError> {
        match event {
            LifecycleEvent::AfterMigrate => {
                let release = self.store.current_release(db)?;
                log::debug!(
                    "Release after migration: '{release}' (locations on '{}')",
                    self.current
                );
                self.observed = Some(release);
            }
            other => log::debug!("{other} on release '{}'", self.current),
        }
        Ok(())
    }
}

/// Drives a [`MigrationEngine`] so its locations follow the stored release
#[derive(Debug)]
pub struct BranchCoordinator<E: MigrationEngine> {
    engine: E,
    tracker: ReleaseTracker,
    max_passes: usize,
}

impl<E: MigrationEngine> BranchCoordinator<E> {
    /// Bind to `engine` using the branching configuration.
    ///
    /// Fails without touching the engine's locations if no connection can
    /// be acquired or the release cannot be read.
    pub fn new(engine: E, config: &BranchingConfig, project_dir: &Path) -> BranchResult<Self> {
        let db = acquire(&engine)?;
        let store = ReleaseStore::from_config(config, db.as_ref(), project_dir)?;
        Self::bootstrap(engine, store, db.as_ref(), config.max_passes)
    }

    /// Bind to `engine` with an already built store
    pub fn with_store(engine: E, store: ReleaseStore, max_passes: usize) -> BranchResult<Self> {
        let db = acquire(&engine)?;
        Self::bootstrap(engine, store, db.as_ref(), max_passes)
    }

    fn bootstrap(
        mut engine: E,
        store: ReleaseStore,
        db: &dyn Database,
        max_passes: usize,
    ) -> BranchResult<Self> {
        if max_passes == 0 {
            return Err(BranchError::Configuration(
                "at least one migration pass must be allowed".to_string(),
            ));
        }

        let release = with_transaction(db, |tx| store.current_release(tx))?;
        let locations = compute_locations("", &release, engine.locations())?;
        log::info!(
            "Current release is '{release}', using locations {}",
            locations.join(",")
        );
        engine.set_locations(locations);

        Ok(Self {
            engine,
            tracker: ReleaseTracker {
                store,
                current: release,
                observed: None,
            },
            max_passes,
        })
    }

    /// Release the engine's locations currently point at
    pub fn release(&self) -> &str {
        &self.tracker.current
    }

    pub fn store(&self) -> &ReleaseStore {
        &self.tracker.store
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn locations(&self) -> &[String] {
        self.engine.locations()
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Migrate until the stored release stops changing.
    ///
    /// A pass that leaves a different release in the store (compared
    /// case-insensitively) switches the locations to it and triggers
    /// another pass. Running out of passes is a configuration error.
    pub fn migrate(&mut self) -> BranchResult<MigrationSummary> {
        let mut applied = 0;
        let mut passes = 0;

        loop {
            if passes == self.max_passes {
                return Err(BranchError::Configuration(format!(
                    "release did not settle after {passes} migration pass(es), last switched to '{}'",
                    self.tracker.current
                )));
            }
            passes += 1;

            self.tracker.observed = None;
            let count = self.engine.migrate(&mut self.tracker)?;
            applied += count;
            if passes > 1 {
                self.report(count)?;
            }

            let Some(observed) = self.tracker.observed.take() else {
                log::warn!("Engine finished without reporting afterMigrate, assuming release is unchanged");
                break;
            };
            if same_release(&observed, &self.tracker.current) {
                break;
            }
            self.switch_to(observed)?;
        }

        Ok(MigrationSummary {
            applied,
            passes,
            release: self.tracker.current.clone(),
        })
    }

    fn switch_to(&mut self, release: String) -> BranchResult<()> {
        let locations = compute_locations(&self.tracker.current, &release, self.engine.locations())?;
        log::info!(
            "Release changed from '{}' to '{release}', switching locations to {}",
            self.tracker.current,
            locations.join(",")
        );
        self.engine.set_locations(locations);
        self.tracker.current = release;
        Ok(())
    }

    fn report(&mut self, count: usize) -> BranchResult<()> {
        let info = self.engine.info(&mut self.tracker)?;
        log::info!(
            "Successfully completed {count} migration(s) to version {}",
            info.current_display()
        );
        Ok(())
    }

    pub fn info(&mut self) -> BranchResult<MigrationInfo> {
        Ok(self.engine.info(&mut self.tracker)?)
    }

    pub fn validate(&mut self) -> BranchResult<()> {
        Ok(self.engine.validate(&mut self.tracker)?)
    }

    pub fn clean(&mut self) -> BranchResult<usize> {
        Ok(self.engine.clean(&mut self.tracker)?)
    }

    pub fn baseline(&mut self) -> BranchResult<()> {
        Ok(self.engine.baseline(&mut self.tracker)?)
    }

    pub fn repair(&mut self) -> BranchResult<usize> {
        Ok(self.engine.repair(&mut self.tracker)?)
    }
}

fn acquire<E: MigrationEngine>(engine: &E) -> BranchResult<Box<dyn Database>> {
    engine
        .connect()
        .map_err(|source| BranchError::ConnectionAcquisition {
            purpose: "read the current release",
            source,
        })
}

fn same_release(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
