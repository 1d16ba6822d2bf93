//! crtrack CLI: CR activity reports from weekly status files.
//!
//! Reads a folder of free-form status updates and produces a person × CR
//! assignment matrix plus a CR-grouped digest of everyone's notes.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
