//! File-based SQL migration engine.
//!
//! Resolves `V<version>__<description>.sql` scripts from the configured
//! locations and applies the ones above the current version, each in its own
//! transaction together with its history row.

use crate::engine::{MigrationEngine, MigrationInfo};
use crate::error::{EngineError, EngineResult};
use crate::event::{LifecycleEvent, LifecycleListener};
use crate::history::{AppliedMigration, HistoryTable, MigrationKind};
use crate::script::{resolve_scripts, ResolvedScript};
use crate::version::Version;
use bw_core::Config;
use bw_db::{qualified_name, with_transaction, DataSource, Database, DbResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const BASELINE_DESCRIPTION: &str = "<< Baseline >>";

/// Settings of a [`Migrator`]
#[derive(Debug, Clone)]
pub struct MigratorSettings {
    /// Directory locations are resolved against
    pub base_dir: PathBuf,
    /// Script locations, relative to `base_dir`
    pub locations: Vec<String>,
    /// Schema holding the history table (default: the connection's current schema)
    pub schema: Option<String>,
    /// History table name
    pub history_table: String,
    /// Baseline a non-empty schema that has no history table yet
    pub baseline_on_migrate: bool,
    /// Version recorded by a baseline
    pub baseline_version: Version,
    /// Check applied checksums before migrating
    pub validate_on_migrate: bool,
}

impl MigratorSettings {
    /// Settings with the default history table and validation enabled
    pub fn new(base_dir: impl Into<PathBuf>, locations: Vec<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            locations,
            schema: None,
            history_table: "schema_version".to_string(),
            baseline_on_migrate: false,
            baseline_version: Version::default(),
            validate_on_migrate: true,
        }
    }

    /// Build settings from the project configuration
    pub fn from_config(config: &Config, base_dir: &Path) -> EngineResult<Self> {
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            locations: config.locations.clone(),
            schema: None,
            history_table: config.history_table.clone(),
            baseline_on_migrate: config.baseline_on_migrate,
            baseline_version: Version::parse(&config.baseline_version)?,
            validate_on_migrate: config.validate_on_migrate,
        })
    }
}

/// SQL migration engine over a [`DataSource`]
#[derive(Debug)]
pub struct Migrator {
    source: DataSource,
    settings: MigratorSettings,
}

impl Migrator {
    pub fn new(source: DataSource, settings: MigratorSettings) -> Self {
        Self { source, settings }
    }

    /// Open the configured database and build a migrator for `project_dir`
    pub fn from_config(config: &Config, project_dir: &Path) -> EngineResult<Self> {
        let path = config.database_path_absolute(project_dir);
        let source =
            DataSource::from_config(&config.database, &path).map_err(EngineError::Connection)?;
        let settings = MigratorSettings::from_config(config, project_dir)?;
        Ok(Self::new(source, settings))
    }

    fn open(&self) -> EngineResult<Box<dyn Database>> {
        self.source.connect().map_err(EngineError::Connection)
    }

    fn history(&self, db: &dyn Database) -> EngineResult<HistoryTable> {
        let schema = match &self.settings.schema {
            Some(schema) => schema.clone(),
            None => db.current_schema()?,
        };
        Ok(HistoryTable::new(schema, self.settings.history_table.as_str()))
    }

    fn resolve(&self) -> EngineResult<Vec<ResolvedScript>> {
        resolve_scripts(&self.settings.base_dir, &self.settings.locations)
    }

    fn applied(&self, history: &HistoryTable, db: &dyn Database) -> EngineResult<Vec<AppliedMigration>> {
        if history.exists(db)? {
            history.applied(db)
        } else {
            Ok(Vec::new())
        }
    }

    /// Create the history table on first migrate, baselining a schema that
    /// already holds tables when allowed to.
    fn prepare_history(&self, history: &HistoryTable, db: &dyn Database) -> EngineResult<()> {
        if history.exists(db)? {
            return Ok(());
        }

        let tables = db.list_tables(history.schema())?;
        if tables.is_empty() {
            history.create(db)?;
            return Ok(());
        }

        if !self.settings.baseline_on_migrate {
            return Err(EngineError::NonEmptySchema {
                schema: history.schema().to_string(),
                tables: tables.join(", "),
            });
        }

        log::info!(
            "Schema {} is not empty, baselining at version {}",
            history.schema(),
            self.settings.baseline_version
        );
        with_transaction(db, |tx| -> EngineResult<()> {
            history.create(tx)?;
            record_baseline(history, tx, &self.settings.baseline_version)?;
            Ok(())
        })
    }

    fn apply(
        &self,
        history: &HistoryTable,
        script: &ResolvedScript,
        db: &dyn Database,
        listener: &mut dyn LifecycleListener,
    ) -> EngineResult<()> {
        fire(listener, LifecycleEvent::BeforeEachMigrate(script), db)?;
        log::info!(
            "Migrating schema {} to version {} - {}",
            history.schema(),
            script.version,
            script.description
        );

        with_transaction(db, |tx| -> EngineResult<()> {
            tx.execute_batch(&script.sql)
                .map_err(|source| EngineError::ScriptFailed {
                    script: script.script.clone(),
                    source,
                })?;
            history.record(
                tx,
                &script.version,
                &script.description,
                &script.script,
                Some(&script.checksum),
                MigrationKind::Sql,
            )?;
            Ok(())
        })?;

        fire(listener, LifecycleEvent::AfterEachMigrate(script), db)
    }
}

impl MigrationEngine for Migrator {
    fn locations(&self) -> &[String] {
        &self.settings.locations
    }

    fn set_locations(&mut self, locations: Vec<String>) {
        log::debug!("Locations set to {}", locations.join(","));
        self.settings.locations = locations;
    }

    fn connect(&self) -> DbResult<Box<dyn Database>> {
        self.source.connect()
    }

    fn migrate(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<usize> {
        let db = self.open()?;
        let db = db.as_ref();
        fire(listener, LifecycleEvent::BeforeMigrate, db)?;

        let history = self.history(db)?;
        self.prepare_history(&history, db)?;

        let scripts = self.resolve()?;
        let applied = history.applied(db)?;
        if self.settings.validate_on_migrate {
            check_checksums(&applied, &scripts)?;
        }

        let current = HistoryTable::current_version(&applied);
        let pending = pending_scripts(&scripts, current.as_ref());
        if pending.is_empty() {
            log::info!(
                "Schema {} is up to date. No migration necessary.",
                history.schema()
            );
        }
        for script in &pending {
            self.apply(&history, script, db, listener)?;
        }

        fire(listener, LifecycleEvent::AfterMigrate, db)?;
        Ok(pending.len())
    }

    fn info(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<MigrationInfo> {
        let db = self.open()?;
        let db = db.as_ref();
        fire(listener, LifecycleEvent::BeforeInfo, db)?;

        let history = self.history(db)?;
        let applied = self.applied(&history, db)?;
        let scripts = self.resolve()?;
        let current = HistoryTable::current_version(&applied);
        let pending = pending_scripts(&scripts, current.as_ref())
            .into_iter()
            .cloned()
            .collect();

        fire(listener, LifecycleEvent::AfterInfo, db)?;
        Ok(MigrationInfo {
            applied,
            pending,
            current,
        })
    }

    fn validate(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<()> {
        let db = self.open()?;
        let db = db.as_ref();
        fire(listener, LifecycleEvent::BeforeValidate, db)?;

        let history = self.history(db)?;
        let applied = self.applied(&history, db)?;
        let scripts = self.resolve()?;
        check_checksums(&applied, &scripts)?;
        log::info!(
            "Successfully validated {} migration(s)",
            applied
                .iter()
                .filter(|m| m.kind == MigrationKind::Sql)
                .count()
        );

        fire(listener, LifecycleEvent::AfterValidate, db)
    }

    fn clean(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<usize> {
        let db = self.open()?;
        let db = db.as_ref();
        fire(listener, LifecycleEvent::BeforeClean, db)?;

        let history = self.history(db)?;
        let tables = db.list_tables(history.schema())?;
        for table in &tables {
            let name = qualified_name(history.schema(), table);
            log::debug!("Dropping table {name}");
            db.execute_batch(&format!("DROP TABLE {name}"))?;
        }
        log::info!(
            "Successfully cleaned schema {} ({} table(s) dropped)",
            history.schema(),
            tables.len()
        );

        fire(listener, LifecycleEvent::AfterClean, db)?;
        Ok(tables.len())
    }

    fn baseline(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<()> {
        let db = self.open()?;
        let db = db.as_ref();
        fire(listener, LifecycleEvent::BeforeBaseline, db)?;

        let history = self.history(db)?;
        let version = &self.settings.baseline_version;
        with_transaction(db, |tx| -> EngineResult<()> {
            if history.exists(tx)? {
                if !history.applied(tx)?.is_empty() {
                    return Err(EngineError::HistoryNotEmpty {
                        table: history.to_string(),
                    });
                }
            } else {
                history.create(tx)?;
            }
            record_baseline(&history, tx, version)?;
            Ok(())
        })?;
        log::info!("Successfully baselined schema with version {version}");

        fire(listener, LifecycleEvent::AfterBaseline, db)
    }

    fn repair(&mut self, listener: &mut dyn LifecycleListener) -> EngineResult<usize> {
        let db = self.open()?;
        let db = db.as_ref();
        fire(listener, LifecycleEvent::BeforeRepair, db)?;

        let history = self.history(db)?;
        let applied = self.applied(&history, db)?;
        let scripts = self.resolve()?;
        let by_version: HashMap<&Version, &ResolvedScript> =
            scripts.iter().map(|s| (&s.version, s)).collect();

        let stale: Vec<(&AppliedMigration, &ResolvedScript)> = applied
            .iter()
            .filter(|m| m.kind == MigrationKind::Sql)
            .filter_map(|m| by_version.get(&m.version).map(|s| (m, *s)))
            .filter(|(m, s)| m.checksum != s.checksum)
            .collect();

        if !stale.is_empty() {
            with_transaction(db, |tx| -> EngineResult<()> {
                for (applied, script) in &stale {
                    log::info!(
                        "Repairing checksum of version {} ({} -> {})",
                        applied.version,
                        applied.checksum,
                        script.checksum
                    );
                    history.update_checksum(tx, &applied.version, &script.checksum)?;
                }
                Ok(())
            })?;
        }
        log::info!("Repaired {} checksum(s) in {history}", stale.len());

        fire(listener, LifecycleEvent::AfterRepair, db)?;
        Ok(stale.len())
    }
}

fn fire(
    listener: &mut dyn LifecycleListener,
    event: LifecycleEvent<'_>,
    db: &dyn Database,
) -> EngineResult<()> {
    log::debug!("Lifecycle event {event}");
    listener
        .on_event(&event, db)
        .map_err(|source| EngineError::Hook {
            event: event.name(),
            source,
        })
}

fn record_baseline(history: &HistoryTable, db: &dyn Database, version: &Version) -> DbResult<()> {
    history.record(
        db,
        version,
        BASELINE_DESCRIPTION,
        BASELINE_DESCRIPTION,
        None,
        MigrationKind::Baseline,
    )
}

fn pending_scripts<'a>(
    scripts: &'a [ResolvedScript],
    current: Option<&Version>,
) -> Vec<&'a ResolvedScript> {
    scripts
        .iter()
        .filter(|s| current.map_or(true, |c| s.version > *c))
        .collect()
}

/// Applied SQL rows must match the script resolved for their version.
/// Rows whose script is not resolvable belong to another release.
fn check_checksums(applied: &[AppliedMigration], scripts: &[ResolvedScript]) -> EngineResult<()> {
    let by_version: HashMap<&Version, &ResolvedScript> =
        scripts.iter().map(|s| (&s.version, s)).collect();

    for migration in applied.iter().filter(|m| m.kind == MigrationKind::Sql) {
        match by_version.get(&migration.version) {
            Some(script) if script.checksum != migration.checksum => {
                return Err(EngineError::ChecksumMismatch {
                    version: migration.version.to_string(),
                    applied: migration.checksum.clone(),
                    resolved: script.checksum.clone(),
                });
            }
            Some(_) => {}
            None => log::debug!(
                "Applied migration {} ({}) is not in the current locations",
                migration.version,
                migration.script
            ),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
