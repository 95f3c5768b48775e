mod cli;
mod commands;
mod config;
mod runner;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match cli.command {
        Command::Build(args) => commands::build::run(args),
        Command::Cleanup(args) => commands::cleanup::run(args),
        Command::EmergencyCleanup(args) => commands::emergency::run(args),
        Command::ValidateBuild(args) => commands::validate::run(args),
        Command::Doctor => commands::doctor::run(),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "bakectl", &mut io::stdout());
            Ok(())
        }
    }
}
