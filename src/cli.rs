use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tempest seasonal ARIMA fitting and forecasting.
#[derive(Parser)]
#[command(
    name = "tempest",
    version,
    about = "Seasonal ARIMA fitting and forecasting"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Fit a model and report its coefficients and diagnostics.
    Fit(FitArgs),
    /// Fit a model and report forecasts with prediction intervals.
    Forecast(ForecastArgs),
}

/// Arguments shared by every subcommand that fits a model.
#[derive(clap::Args)]
pub struct FitArgs {
    /// Path to the series: one observation per line, `#` starts a comment.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path for the JSON report. Printed to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Interrupt the fit after this many seconds.
    #[arg(long = "timeout-secs")]
    pub timeout_secs: Option<u64>,
}

/// Arguments for the `forecast` subcommand.
#[derive(clap::Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub fit: FitArgs,

    /// Override the forecast horizon from config.
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Override the interval significance level from config.
    #[arg(long)]
    pub alpha: Option<f64>,
}
