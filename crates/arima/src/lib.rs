//! # tempest-arima
//!
//! Seasonal ARIMA(p,d,q)(P,D,Q) fitting by conditional sum of squares or
//! exact maximum likelihood (Kalman filter), with point forecasts and
//! Gaussian prediction intervals.
//!
//! ## Workflow
//!
//! ```mermaid
//! graph LR
//!     A["ArimaConfig::from_order(order)"] -->|"ArimaModel::fit(&series, &config)?"| B["ArimaModel"]
//!     C["ArimaConfig::from_coefficients(coefs)"] -->|"evaluate only"| B
//!     B --> D[".coefficients() / .std_errors()"]
//!     B --> E[".sigma2() / .log_likelihood() / .aic()"]
//!     B --> F[".forecast(h, alpha)?"]
//! ```
//!
//! ## Fitting strategies
//!
//! | Strategy | Optimised objective | Reported likelihood |
//! |----------|--------------------|---------------------|
//! | [`FittingStrategy::Css`] | conditional sum of squares | CSS |
//! | [`FittingStrategy::Ml`] | exact likelihood | exact |
//! | [`FittingStrategy::CssMl`] (default) | CSS, then exact likelihood from the CSS estimate | exact |
//!
//! ## Conventions
//!
//! | Symbol | Accessor | Meaning |
//! |--------|----------|---------|
//! | phi | [`ArimaCoefficients::ar()`] | AR polynomial `1 − Σ φᵢ Bⁱ` |
//! | theta | [`ArimaCoefficients::ma()`] | MA polynomial `1 + Σ θⱼ Bʲ` |
//! | mu | [`ArimaCoefficients::mean()`] | mean of the differenced series |
//! | sigma2 | [`ArimaModel::sigma2()`] | innovation variance |
//!
//! Coefficient vectors use the layout
//! `[ar(p), ma(q), sar(P), sma(Q), drift?, mean?]`.
//!
//! ## Example
//!
//! ```ignore
//! let series = TimeSeries::new(TimePeriod::one_month(), values)?;
//! let config = ArimaConfig::from_order(ArimaOrder::seasonal(0, 1, 1, 0, 1, 1));
//! let model = ArimaModel::fit(&series, &config)?;
//! let fc = model.forecast(12, 0.05)?;
//! ```

mod coefficients;
mod config;
mod difference;
mod error;
mod estimate;
mod model;
mod objective;
mod order;

pub mod forecast;

pub(crate) mod kalman;
pub(crate) mod poly;
pub(crate) mod state_space;

pub use coefficients::ArimaCoefficients;
pub use config::{ArimaConfig, FittingStrategy, ModelSpec};
pub use difference::{Differencer, difference};
pub use error::ArimaError;
pub use forecast::Forecast;
pub use model::{ArimaModel, FitStatus, Model};
pub use objective::{Evaluation, Evaluator, Objective};
pub use order::ArimaOrder;
