//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Organise a sequencing runfolder into a delivery layout
#[derive(Parser, Debug)]
#[command(name = "organise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Apply a rule document
    ///
    /// Examples:
    ///   organise run rules.yml --var RUNFOLDER_NAME=200624_A00834_0183_BHMTFYDRXX
    ///   organise run rules.yml --root /proj/incoming --dry-run
    ///   organise run rules.yml --json
    Run {
        /// Rule document (YAML, JSON or TOML)
        #[arg(env = "ORGANISE_CONFIG")]
        config: PathBuf,

        /// Directory relative sources and destinations resolve against
        #[arg(long, env = "ORGANISE_ROOT", default_value = ".")]
        root: PathBuf,

        /// Add or override a top-level variable
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_variable)]
        vars: Vec<(String, String)>,

        /// Report what would be done without touching the filesystem
        #[arg(long)]
        dry_run: bool,

        /// Output the report as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Validate a rule document without touching the filesystem
    Check {
        /// Rule document (YAML, JSON or TOML)
        #[arg(env = "ORGANISE_CONFIG")]
        config: PathBuf,

        /// Add or override a top-level variable
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_variable)]
        vars: Vec<(String, String)>,
    },
}

/// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
fn parse_variable(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty variable name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
