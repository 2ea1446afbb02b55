//! validate, clean, baseline and repair: engine operations run through
//! the release coordinator

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, open_coordinator};

pub fn validate(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut coordinator = open_coordinator(&project)?;
    coordinator.validate().context("Validation failed")?;
    println!("Migrations for release '{}' are valid", coordinator.release());
    Ok(())
}

pub fn clean(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut coordinator = open_coordinator(&project)?;
    let dropped = coordinator.clean().context("Clean failed")?;
    println!("Dropped {dropped} table(s)");
    Ok(())
}

pub fn baseline(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut coordinator = open_coordinator(&project)?;
    coordinator.baseline().context("Baseline failed")?;
    println!(
        "Baselined at version {}",
        project.config.baseline_version
    );
    Ok(())
}

pub fn repair(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut coordinator = open_coordinator(&project)?;
    let repaired = coordinator.repair().context("Repair failed")?;
    println!("Repaired {repaired} checksum(s)");
    Ok(())
}
