//! Branchway CLI - release-branched schema migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{info, maintenance, migrate, release};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        Commands::Migrate => migrate::execute(&cli.global),
        Commands::Info(args) => info::execute(args, &cli.global),
        Commands::Validate => maintenance::validate(&cli.global),
        Commands::Clean => maintenance::clean(&cli.global),
        Commands::Baseline => maintenance::baseline(&cli.global),
        Commands::Repair => maintenance::repair(&cli.global),
        Commands::Release(args) => release::execute(args, &cli.global),
    }
}

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
