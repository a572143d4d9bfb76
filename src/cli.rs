//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "rstow",
    about = "Declarative symlink manager with conditional rules and redirects",
    version
)]
pub struct Cli {
    /// Subcommand; omitted for a normal linking run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every mode.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all run modes.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Source directory links will be linked from
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Target directory links will be linked to
    #[arg(short, long, global = true)]
    pub target: Option<PathBuf>,

    /// Profile used when evaluating if-profile blocks
    #[arg(short, long, global = true, default_value = "default")]
    pub profile: String,

    /// Treat any config irregularity as a hard, run-aborting failure
    #[arg(short = 'i', long, global = true)]
    pub enforce_integrity: bool,

    /// Overwrite conflicting regular files (this WILL destroy their content)
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Assume 'yes' for every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Also overwrite entries owned by other users
    #[arg(long, global = true)]
    pub overwrite_others: bool,

    /// Exclude a source-relative path from the run (repeatable)
    #[arg(short, long, global = true)]
    pub exclude: Vec<PathBuf>,

    /// Don't create missing parent directories in the target tree
    #[arg(short = 'n', long = "no-parents", global = true, action = clap::ArgAction::SetFalse)]
    pub parents: bool,

    /// Don't honour redirects from any encountered config
    #[arg(short = 'r', long = "no-redirects", global = true, action = clap::ArgAction::SetFalse)]
    pub redirects: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved virtual tree and conflicts without changing anything
    Status,
}
