//! Fixed model coefficients and the flat layout shared with the optimiser.

use crate::error::ArimaError;
use crate::order::ArimaOrder;

/// Coefficients of a seasonal ARIMA model.
///
/// The AR polynomial is `1 − Σ φᵢ Bⁱ` and the MA polynomial is
/// `1 + Σ θⱼ Bʲ`; seasonal polynomials use the same signs in powers of
/// `Bˢ`. The flat layout used by [`to_vec`](Self::to_vec) and
/// [`from_slice`](Self::from_slice) is
///
/// ```text
/// [ ar(p) | ma(q) | sar(P) | sma(Q) | drift? | mean? ]
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArimaCoefficients {
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    d: usize,
    seasonal_d: usize,
    drift: Option<f64>,
    mean: Option<f64>,
}

impl ArimaCoefficients {
    /// Non-seasonal AR and MA coefficients with no differencing and no
    /// regression terms.
    pub fn new(ar: Vec<f64>, ma: Vec<f64>) -> Self {
        Self {
            ar,
            ma,
            ..Self::default()
        }
    }

    /// Sets the seasonal AR and MA coefficients.
    pub fn with_seasonal(mut self, seasonal_ar: Vec<f64>, seasonal_ma: Vec<f64>) -> Self {
        self.seasonal_ar = seasonal_ar;
        self.seasonal_ma = seasonal_ma;
        self
    }

    /// Sets the regular and seasonal differencing orders.
    pub fn with_differences(mut self, d: usize, seasonal_d: usize) -> Self {
        self.d = d;
        self.seasonal_d = seasonal_d;
        self
    }

    /// Sets the mean of the differenced series.
    pub fn with_mean(mut self, mean: f64) -> Self {
        self.mean = Some(mean);
        self
    }

    /// Sets the drift slope.
    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = Some(drift);
        self
    }

    /// Rebuilds coefficients from the flat layout for `order`.
    pub fn from_slice(order: &ArimaOrder, values: &[f64]) -> Result<Self, ArimaError> {
        let expected = order.n_coefficients();
        if values.len() != expected {
            return Err(ArimaError::invalid_order(format!(
                "{order} has {expected} coefficients, got {}",
                values.len()
            )));
        }
        let mut offset = 0;
        let mut take = |n: usize| {
            let part = values[offset..offset + n].to_vec();
            offset += n;
            part
        };
        let ar = take(order.p());
        let ma = take(order.q());
        let seasonal_ar = take(order.seasonal_p());
        let seasonal_ma = take(order.seasonal_q());
        let drift = order.drift().then(|| take(1)[0]);
        let mean = order.constant().then(|| take(1)[0]);
        Ok(Self {
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
            d: order.d(),
            seasonal_d: order.seasonal_d(),
            drift,
            mean,
        })
    }

    /// Flattens into the layout documented on the type.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.order().n_coefficients());
        out.extend_from_slice(&self.ar);
        out.extend_from_slice(&self.ma);
        out.extend_from_slice(&self.seasonal_ar);
        out.extend_from_slice(&self.seasonal_ma);
        out.extend(self.drift);
        out.extend(self.mean);
        out
    }

    /// The order these coefficients describe.
    pub fn order(&self) -> ArimaOrder {
        ArimaOrder::seasonal(
            self.ar.len(),
            self.d,
            self.ma.len(),
            self.seasonal_ar.len(),
            self.seasonal_d,
            self.seasonal_ma.len(),
        )
        .with_constant(self.mean.is_some())
        .with_drift(self.drift.is_some())
    }

    pub fn ar(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma(&self) -> &[f64] {
        &self.ma
    }

    pub fn seasonal_ar(&self) -> &[f64] {
        &self.seasonal_ar
    }

    pub fn seasonal_ma(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Drift slope, if the model has one.
    pub fn drift(&self) -> Option<f64> {
        self.drift
    }

    /// Mean of the differenced series, if the model has one.
    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    /// Intercept of the ARMA difference equation, `μ · φ(1) · Φ(1)`.
    ///
    /// Zero when the model has no mean.
    pub fn intercept(&self) -> f64 {
        let phi_1 = 1.0 - self.ar.iter().sum::<f64>();
        let seasonal_phi_1 = 1.0 - self.seasonal_ar.iter().sum::<f64>();
        self.mean.unwrap_or(0.0) * phi_1 * seasonal_phi_1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn layout_round_trip() {
        let coefs = ArimaCoefficients::new(vec![0.5, -0.2], vec![0.3])
            .with_seasonal(vec![0.1], vec![-0.4])
            .with_differences(1, 0)
            .with_drift(0.05);
        assert_eq!(coefs.to_vec(), vec![0.5, -0.2, 0.3, 0.1, -0.4, 0.05]);

        let order = coefs.order();
        assert_eq!(order, ArimaOrder::seasonal(2, 1, 1, 1, 0, 1).with_drift(true));
        let back = ArimaCoefficients::from_slice(&order, &coefs.to_vec()).unwrap();
        assert_eq!(back, coefs);
    }

    #[test]
    fn mean_comes_last() {
        let coefs = ArimaCoefficients::new(vec![0.5], vec![])
            .with_drift(0.1)
            .with_mean(2.0);
        assert_eq!(coefs.to_vec(), vec![0.5, 0.1, 2.0]);
    }

    #[test]
    fn from_slice_checks_length() {
        let order = ArimaOrder::new(1, 0, 1);
        let err = ArimaCoefficients::from_slice(&order, &[0.1, 0.2]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid model order: ARIMA(1,0,1) with constant has 3 coefficients, got 2"
        );
    }

    #[test]
    fn intercept_scales_mean() {
        let coefs = ArimaCoefficients::new(vec![0.5], vec![0.3])
            .with_seasonal(vec![0.2], vec![])
            .with_mean(10.0);
        assert_abs_diff_eq!(coefs.intercept(), 10.0 * 0.5 * 0.8, epsilon = 1e-12);
        assert_eq!(ArimaCoefficients::new(vec![0.5], vec![]).intercept(), 0.0);
    }
}
