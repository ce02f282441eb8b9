//! `fit` and `forecast` commands.

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, info_span, warn};

use tempest_arima::{ArimaError, ArimaModel};
use tempest_optim::CancelToken;

use crate::cli::{FitArgs, ForecastArgs};
use crate::config::TempestConfig;
use crate::convert;
use crate::input;
use crate::report::{FitReport, ForecastReport};

/// Run the `fit` command.
pub fn run_fit(args: FitArgs) -> Result<()> {
    let _cmd = info_span!("fit").entered();
    let config = TempestConfig::load(args.config.as_deref())?;
    let model = fit_model(&args, &config)?;
    write_report(&FitReport::new(&model), args.output.as_deref())
}

/// Run the `forecast` command.
pub fn run_forecast(args: ForecastArgs) -> Result<()> {
    let _cmd = info_span!("forecast").entered();
    let config = TempestConfig::load(args.fit.config.as_deref())?;
    let horizon = args.horizon.unwrap_or(config.forecast.horizon);
    let alpha = args.alpha.unwrap_or(config.forecast.alpha);

    let model = fit_model(&args.fit, &config)?;
    let forecast = model
        .forecast(horizon, alpha)
        .context("forecasting failed")?;
    info!(horizon, alpha, "forecast computed");
    write_report(
        &ForecastReport::new(&model, &forecast),
        args.fit.output.as_deref(),
    )
}

/// Reads the series and fits the configured model, honouring the timeout.
fn fit_model(args: &FitArgs, config: &TempestConfig) -> Result<ArimaModel> {
    let period = convert::build_sampling_period(&config.series)?;
    let series = input::read_series(&args.input, period)?;
    info!(path = %args.input.display(), n = series.len(), "series loaded");

    let cancel = CancelToken::new();
    let arima = convert::build_arima_config(config, cancel.clone())?;

    let result = match args.timeout_secs {
        Some(secs) => with_watchdog(cancel, Duration::from_secs(secs), || {
            ArimaModel::fit(&series, &arima)
        }),
        None => ArimaModel::fit(&series, &arima),
    };

    match result {
        Ok(model) => Ok(model),
        Err(ArimaError::Interrupted { iterations, best }) => {
            bail!("fit timed out after {iterations} iterations; best coefficients so far: {best:?}")
        }
        Err(e) => Err(e).context("fitting failed"),
    }
}

/// Runs `work`, tripping `cancel` if it has not finished within `timeout`.
fn with_watchdog<T>(cancel: CancelToken, timeout: Duration, work: impl FnOnce() -> T) -> T {
    let (done, finished) = mpsc::channel::<()>();
    let watchdog = thread::spawn(move || {
        if let Err(mpsc::RecvTimeoutError::Timeout) = finished.recv_timeout(timeout) {
            warn!(?timeout, "timeout reached; cancelling fit");
            cancel.cancel();
        }
    });
    let out = work();
    drop(done);
    if watchdog.join().is_err() {
        warn!("watchdog thread panicked");
    }
    out
}

fn write_report<T: Serialize>(report: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write report: {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
