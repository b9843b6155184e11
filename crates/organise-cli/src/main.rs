//! Runfolder organiser CLI
//!
//! Applies a rule document to a sequencing runfolder and reports what was
//! linked or copied where.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Commands::Run {
            config,
            root,
            vars,
            dry_run,
            json,
        } => commands::run_organise(&config, &root, &vars, dry_run, json),
        Commands::Check { config, vars } => commands::run_check(&config, &vars),
    }
}
