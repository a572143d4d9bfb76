//! Command-line entry point for rstow, a declarative symlink manager.

use anyhow::Result;
use clap::Parser;

use rstow::logging::Logger;
use rstow::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = Logger::new();

    match args.command {
        Some(cli::Command::Status) => commands::status::run(&args.global, &log),
        None => commands::link::run(&args.global, &log),
    }
}
