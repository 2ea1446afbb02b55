//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use bw_core::Config;
use bw_db::{DataSource, Database};
use bw_engine::Migrator;
use bw_release::{BranchCoordinator, ReleaseStore};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Configuration together with the directory paths are resolved against
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

/// Load the project configuration
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load configuration")?;
    Ok(Project { root, config })
}

/// Build the migrator and bind a coordinator to it
pub(crate) fn open_coordinator(project: &Project) -> Result<BranchCoordinator<Migrator>> {
    let migrator = Migrator::from_config(&project.config, &project.root)
        .context("Failed to open migration engine")?;
    BranchCoordinator::new(migrator, &project.config.branching, &project.root)
        .context("Failed to initialize release branching")
}

/// Open a connection and the release store without building a migrator
pub(crate) fn open_store(project: &Project) -> Result<(Box<dyn Database>, ReleaseStore)> {
    let path = project.config.database_path_absolute(&project.root);
    let source = DataSource::from_config(&project.config.database, &path)
        .with_context(|| format!("Failed to open database {path}"))?;
    let db = source.connect().context("Failed to connect to database")?;
    let store = ReleaseStore::from_config(&project.config.branching, db.as_ref(), &project.root)
        .context("Failed to set up release store")?;
    Ok((db, store))
}
