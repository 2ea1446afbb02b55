//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Branchway - schema migrations that follow the release stored in the database
#[derive(Parser, Debug)]
#[command(name = "bw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations, following release changes
    Migrate,

    /// Show the current release and applied/pending migrations
    Info(InfoArgs),

    /// Check applied migrations against the scripts on disk
    Validate,

    /// Drop every table in the schema, control table included
    Clean,

    /// Record a baseline in an empty history
    Baseline,

    /// Realign stored checksums with the scripts on disk
    Repair,

    /// Inspect or change the stored release
    Release(ReleaseArgs),
}

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the release command
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    #[command(subcommand)]
    pub command: ReleaseCommand,
}

/// Release subcommands
#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// Print the stored release
    Show,

    /// Store a new release under the control table lock
    Set(SetReleaseArgs),
}

/// Arguments for release set
#[derive(Args, Debug)]
pub struct SetReleaseArgs {
    /// Release to switch to
    pub name: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
