//! Release command implementation
//!
//! `release set` is the write path for the stored release: it holds the
//! control table lock across its read and write so two operators cannot
//! interleave.

use anyhow::{Context, Result};
use bw_db::with_transaction;
use bw_release::{validate_release, BranchError};

use crate::cli::{GlobalArgs, ReleaseArgs, ReleaseCommand, SetReleaseArgs};
use crate::commands::common::{load_project, open_store};

/// Execute the release command
pub fn execute(args: &ReleaseArgs, global: &GlobalArgs) -> Result<()> {
    match &args.command {
        ReleaseCommand::Show => show(global),
        ReleaseCommand::Set(set_args) => set(set_args, global),
    }
}

fn show(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (db, store) = open_store(&project)?;
    let release = with_transaction(db.as_ref(), |tx| store.current_release(tx))
        .context("Failed to read release")?;
    println!("{release}");
    Ok(())
}

fn set(args: &SetReleaseArgs, global: &GlobalArgs) -> Result<()> {
    validate_release(&args.name)?;
    let project = load_project(global)?;
    let (db, store) = open_store(&project)?;

    let previous = with_transaction(db.as_ref(), |tx| -> Result<String, BranchError> {
        store.lock(tx)?;
        let previous = store.current_release(tx)?;
        store.set_current_release(tx, &args.name)?;
        Ok(previous)
    })
    .with_context(|| format!("Failed to set release to '{}'", args.name))?;

    log::debug!("Release lock on {} released", store.table());
    println!("{previous} -> {}", args.name);
    Ok(())
}
