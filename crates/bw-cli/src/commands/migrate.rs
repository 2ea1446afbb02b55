//! Migrate command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, open_coordinator};

/// Execute the migrate command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut coordinator = open_coordinator(&project)?;

    let summary = coordinator.migrate().context("Migration failed")?;
    println!(
        "Applied {} migration(s) in {} pass(es); release is now '{}'",
        summary.applied, summary.passes, summary.release
    );
    Ok(())
}
