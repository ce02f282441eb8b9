//! Model order: AR / differencing / MA degrees plus regression terms.

use std::fmt;

use crate::error::ArimaError;

/// Order of a seasonal ARIMA(p,d,q)(P,D,Q) model.
///
/// The constant is a mean of the *differenced* series. Drift is a slope on
/// the time index, differenced with the same orders as the series, so it is
/// only identifiable when at most one difference is taken.
///
/// | Constructor | Constant default |
/// |-------------|------------------|
/// | [`ArimaOrder::new`] | included iff `d == 0` |
/// | [`ArimaOrder::seasonal`] | included iff `d + D == 0` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArimaOrder {
    p: usize,
    d: usize,
    q: usize,
    seasonal_p: usize,
    seasonal_d: usize,
    seasonal_q: usize,
    constant: bool,
    drift: bool,
}

impl ArimaOrder {
    /// Non-seasonal ARIMA(p,d,q).
    ///
    /// ```
    /// use tempest_arima::ArimaOrder;
    ///
    /// let order = ArimaOrder::new(1, 1, 1);
    /// assert!(!order.constant());
    /// assert_eq!(order.n_coefficients(), 2);
    /// ```
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::seasonal(p, d, q, 0, 0, 0)
    }

    /// Seasonal ARIMA(p,d,q)(P,D,Q).
    pub fn seasonal(
        p: usize,
        d: usize,
        q: usize,
        seasonal_p: usize,
        seasonal_d: usize,
        seasonal_q: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            constant: d + seasonal_d == 0,
            drift: false,
        }
    }

    /// Builds an order from signed components, rejecting negative values.
    ///
    /// Components are given as `[p, d, q, P, D, Q]`.
    pub fn from_signed(components: [i64; 6]) -> Result<Self, ArimaError> {
        const NAMES: [&str; 6] = ["p", "d", "q", "P", "D", "Q"];
        let mut values = [0usize; 6];
        for (i, (&value, name)) in components.iter().zip(NAMES).enumerate() {
            values[i] = usize::try_from(value).map_err(|_| {
                ArimaError::invalid_order(format!("{name} must be non-negative, got {value}"))
            })?;
        }
        let [p, d, q, sp, sd, sq] = values;
        Ok(Self::seasonal(p, d, q, sp, sd, sq))
    }

    /// Overrides whether a constant (mean of the differenced series) is fitted.
    pub fn with_constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }

    /// Overrides whether a drift term is fitted.
    pub fn with_drift(mut self, drift: bool) -> Self {
        self.drift = drift;
        self
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn d(&self) -> usize {
        self.d
    }

    pub fn q(&self) -> usize {
        self.q
    }

    pub fn seasonal_p(&self) -> usize {
        self.seasonal_p
    }

    pub fn seasonal_d(&self) -> usize {
        self.seasonal_d
    }

    pub fn seasonal_q(&self) -> usize {
        self.seasonal_q
    }

    pub fn constant(&self) -> bool {
        self.constant
    }

    pub fn drift(&self) -> bool {
        self.drift
    }

    /// `true` if any seasonal component is non-zero.
    pub fn is_seasonal(&self) -> bool {
        self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }

    /// Total number of differences, `d + D`.
    pub fn total_differences(&self) -> usize {
        self.d + self.seasonal_d
    }

    /// Number of ARMA coefficients, `p + q + P + Q`.
    pub fn n_arma(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Length of the coefficient vector, regression terms included.
    pub fn n_coefficients(&self) -> usize {
        self.n_arma() + usize::from(self.drift) + usize::from(self.constant)
    }

    /// Checks the order against the seasonal frequency it will be fitted with.
    pub fn validate(&self, seasonal_frequency: usize) -> Result<(), ArimaError> {
        if self.is_seasonal() && seasonal_frequency == 0 {
            return Err(ArimaError::invalid_order(format!(
                "seasonal order {self} needs a seasonal frequency of at least 1"
            )));
        }
        let differences = self.total_differences();
        if self.drift && differences > 1 {
            return Err(ArimaError::invalid_order(format!(
                "drift is not identifiable with {differences} differences"
            )));
        }
        if self.drift && self.constant && differences > 0 {
            return Err(ArimaError::invalid_order(
                "constant and drift are collinear after differencing",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)?;
        if self.is_seasonal() {
            write!(
                f,
                "({},{},{})",
                self.seasonal_p, self.seasonal_d, self.seasonal_q
            )?;
        }
        match (self.constant, self.drift) {
            (true, true) => f.write_str(" with constant and drift"),
            (true, false) => f.write_str(" with constant"),
            (false, true) => f.write_str(" with drift"),
            (false, false) => Ok(()),
        }
    }
}
