mod cli;
mod config;
mod convert;
mod fit_cmd;
mod input;
mod logging;
mod report;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Fit(args) => fit_cmd::run_fit(args),
        Command::Forecast(args) => fit_cmd::run_forecast(args),
    }
}
