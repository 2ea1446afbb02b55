//! Info command implementation

use anyhow::{Context, Result};
use bw_engine::MigrationInfo;
use serde::Serialize;

use crate::cli::{GlobalArgs, InfoArgs};
use crate::commands::common::{load_project, open_coordinator};

#[derive(Debug, Serialize)]
struct InfoReport {
    release: String,
    locations: Vec<String>,
    current_version: Option<String>,
    applied: Vec<AppliedEntry>,
    pending: Vec<PendingEntry>,
}

#[derive(Debug, Serialize)]
struct AppliedEntry {
    rank: i64,
    version: String,
    description: String,
    script: String,
    kind: &'static str,
    installed_on: String,
}

#[derive(Debug, Serialize)]
struct PendingEntry {
    version: String,
    description: String,
    script: String,
    location: String,
}

fn build_report(release: &str, locations: &[String], info: &MigrationInfo) -> InfoReport {
    InfoReport {
        release: release.to_string(),
        locations: locations.to_vec(),
        current_version: info.current.as_ref().map(ToString::to_string),
        applied: info
            .applied
            .iter()
            .map(|m| AppliedEntry {
                rank: m.installed_rank,
                version: m.version.to_string(),
                description: m.description.clone(),
                script: m.script.clone(),
                kind: m.kind.as_str(),
                installed_on: m.installed_on.clone(),
            })
            .collect(),
        pending: info
            .pending
            .iter()
            .map(|s| PendingEntry {
                version: s.version.to_string(),
                description: s.description.clone(),
                script: s.script.clone(),
                location: s.location.clone(),
            })
            .collect(),
    }
}

/// Execute the info command
pub fn execute(args: &InfoArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut coordinator = open_coordinator(&project)?;
    let info = coordinator.info().context("Failed to read migration info")?;
    let report = build_report(coordinator.release(), coordinator.locations(), &info);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Release:   {}", report.release);
    println!("Locations: {}", report.locations.join(", "));
    println!("Version:   {}", info.current_display());
    println!();
    println!("{:<6} {:<10} {:<9} {:<40} STATE", "RANK", "VERSION", "KIND", "DESCRIPTION");
    for entry in &report.applied {
        println!(
            "{:<6} {:<10} {:<9} {:<40} applied {}",
            entry.rank, entry.version, entry.kind, entry.description, entry.installed_on
        );
    }
    for entry in &report.pending {
        println!(
            "{:<6} {:<10} {:<9} {:<40} pending ({})",
            "", entry.version, "SQL", entry.description, entry.location
        );
    }
    println!();
    println!(
        "{} applied, {} pending",
        report.applied.len(),
        report.pending.len()
    );
    Ok(())
}

#[cfg(test)]
#[path = "info_test.rs"]
mod tests;
