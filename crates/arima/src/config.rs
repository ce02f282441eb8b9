//! Fitting configuration.

use std::fmt;
use std::str::FromStr;

use tempest_optim::{BfgsOptions, CancelToken};
use tempest_series::TimePeriod;

use crate::coefficients::ArimaCoefficients;
use crate::error::ArimaError;
use crate::order::ArimaOrder;

/// How coefficients are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FittingStrategy {
    /// Minimise the conditional sum of squares.
    Css,
    /// Maximise the exact Gaussian likelihood.
    Ml,
    /// Run a full CSS fit, then use it as the ML starting point.
    #[default]
    CssMl,
}

impl FittingStrategy {
    /// Short machine-readable name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Ml => "ml",
            Self::CssMl => "css-ml",
        }
    }
}

impl fmt::Display for FittingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Css => "conditional sum-of-squares",
            Self::Ml => "maximum likelihood",
            Self::CssMl => "conditional sum-of-squares, then maximum likelihood",
        };
        f.write_str(text)
    }
}

impl FromStr for FittingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "ml" => Ok(Self::Ml),
            "css-ml" | "cssml" | "css_ml" => Ok(Self::CssMl),
            other => Err(format!(
                "unknown fitting strategy {other:?} (expected css, ml or css-ml)"
            )),
        }
    }
}

/// What to fit: an order to estimate, or fixed coefficients to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSpec {
    /// Estimate coefficients for this order.
    Order(ArimaOrder),
    /// Skip optimisation and evaluate these coefficients.
    Coefficients(ArimaCoefficients),
}

impl ModelSpec {
    /// The order being fitted or evaluated.
    pub fn order(&self) -> ArimaOrder {
        match self {
            Self::Order(order) => *order,
            Self::Coefficients(coefficients) => coefficients.order(),
        }
    }
}

/// Configuration for [`ArimaModel::fit`](crate::ArimaModel::fit).
///
/// | Field | Default |
/// |-------|---------|
/// | seasonal cycle | one year |
/// | strategy | [`FittingStrategy::CssMl`] |
/// | optimiser | [`BfgsOptions::default()`] |
/// | cancel token | a fresh, untripped token |
/// | starting point | ARMA terms zero, regression terms by least squares |
///
/// # Example
///
/// ```
/// use tempest_arima::{ArimaConfig, ArimaOrder, FittingStrategy};
/// use tempest_series::TimePeriod;
///
/// let config = ArimaConfig::from_order(ArimaOrder::seasonal(1, 0, 1, 0, 1, 1))
///     .with_seasonal_cycle(TimePeriod::one_year())
///     .with_strategy(FittingStrategy::Ml);
/// assert_eq!(config.strategy(), FittingStrategy::Ml);
/// ```
#[derive(Debug, Clone)]
pub struct ArimaConfig {
    spec: ModelSpec,
    seasonal_cycle: TimePeriod,
    strategy: FittingStrategy,
    optimizer: BfgsOptions,
    cancel: CancelToken,
    start: Option<Vec<f64>>,
}

impl ArimaConfig {
    /// Estimate coefficients for `order`.
    pub fn from_order(order: ArimaOrder) -> Self {
        Self::with_spec(ModelSpec::Order(order))
    }

    /// Evaluate fixed `coefficients` without optimisation.
    pub fn from_coefficients(coefficients: ArimaCoefficients) -> Self {
        Self::with_spec(ModelSpec::Coefficients(coefficients))
    }

    fn with_spec(spec: ModelSpec) -> Self {
        Self {
            spec,
            seasonal_cycle: TimePeriod::one_year(),
            strategy: FittingStrategy::default(),
            optimizer: BfgsOptions::default(),
            cancel: CancelToken::new(),
            start: None,
        }
    }

    /// Sets the duration of one seasonal cycle.
    pub fn with_seasonal_cycle(mut self, cycle: TimePeriod) -> Self {
        self.seasonal_cycle = cycle;
        self
    }

    pub fn with_strategy(mut self, strategy: FittingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_optimizer(mut self, options: BfgsOptions) -> Self {
        self.optimizer = options;
        self
    }

    /// Sets the token a caller can trip to interrupt the fit.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Seeds the optimiser with a coefficient vector in the standard layout.
    pub fn with_start(mut self, start: Vec<f64>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn seasonal_cycle(&self) -> TimePeriod {
        self.seasonal_cycle
    }

    pub fn strategy(&self) -> FittingStrategy {
        self.strategy
    }

    pub fn optimizer(&self) -> &BfgsOptions {
        &self.optimizer
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn start(&self) -> Option<&[f64]> {
        self.start.as_deref()
    }

    /// Checks everything that can be checked without the series.
    pub fn validate(&self) -> Result<(), ArimaError> {
        self.optimizer.validate()?;
        if let Some(start) = &self.start {
            let order = self.spec.order();
            if start.len() != order.n_coefficients() {
                return Err(ArimaError::invalid_order(format!(
                    "starting point has {} values but {order} has {} coefficients",
                    start.len(),
                    order.n_coefficients()
                )));
            }
            if start.iter().any(|v| !v.is_finite()) {
                return Err(ArimaError::invalid_order(
                    "starting point contains non-finite values",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ArimaConfig::from_order(ArimaOrder::new(1, 1, 1));
        assert_eq!(config.strategy(), FittingStrategy::CssMl);
        assert_eq!(config.seasonal_cycle(), TimePeriod::one_year());
        assert_eq!(config.optimizer(), &BfgsOptions::default());
        assert!(!config.cancel_token().is_cancelled());
        assert!(config.start().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn spec_order_from_coefficients() {
        let coefs = ArimaCoefficients::new(vec![0.6], vec![-0.5]).with_differences(1, 0);
        let config = ArimaConfig::from_coefficients(coefs);
        assert_eq!(config.spec().order(), ArimaOrder::new(1, 1, 1));
    }

    #[test]
    fn start_length_checked() {
        let config = ArimaConfig::from_order(ArimaOrder::new(1, 0, 1)).with_start(vec![0.1]);
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid model order: starting point has 1 values but ARIMA(1,0,1) with constant has 3 coefficients"
        );
    }

    #[test]
    fn invalid_optimizer_options_surface() {
        let config = ArimaConfig::from_order(ArimaOrder::new(1, 0, 0))
            .with_optimizer(BfgsOptions::new().with_gradient_tolerance(-1.0));
        assert!(matches!(config.validate(), Err(ArimaError::Optim(_))));
    }

    #[test]
    fn strategy_names_and_descriptions() {
        assert_eq!(FittingStrategy::CssMl.name(), "css-ml");
        assert_eq!(FittingStrategy::Css.to_string(), "conditional sum-of-squares");
        assert_eq!(
            FittingStrategy::CssMl.to_string(),
            "conditional sum-of-squares, then maximum likelihood"
        );
        assert_eq!("ML".parse::<FittingStrategy>(), Ok(FittingStrategy::Ml));
        assert!("lbfgs".parse::<FittingStrategy>().is_err());
    }
}
