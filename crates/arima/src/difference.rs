//! Regular and seasonal differencing and its inverse.

use std::iter;

use crate::error::ArimaError;
use crate::order::ArimaOrder;

/// Applies `(1 − B)ᵈ (1 − Bˢ)ᴰ` to a series and undoes it for forecasts.
///
/// Regular differences are taken first, then seasonal ones. Each difference
/// consumes `lag` leading observations, so the differenced series is
/// [`loss`](Self::loss) values shorter than its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Differencer {
    d: usize,
    seasonal_d: usize,
    period: usize,
}

impl Differencer {
    pub fn new(d: usize, seasonal_d: usize, period: usize) -> Self {
        Self {
            d,
            seasonal_d,
            period,
        }
    }

    /// Differencer matching the differencing orders of `order`.
    pub fn for_order(order: &ArimaOrder, period: usize) -> Self {
        Self::new(order.d(), order.seasonal_d(), period)
    }

    /// Seasonal lag `s`.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Number of observations lost to differencing, `d + D·s`.
    pub fn loss(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    fn check_period(&self) -> Result<(), ArimaError> {
        if self.seasonal_d > 0 && self.period == 0 {
            return Err(ArimaError::invalid_order(
                "seasonal differencing requires a positive period",
            ));
        }
        Ok(())
    }

    fn lags(&self) -> impl Iterator<Item = usize> {
        iter::repeat_n(1, self.d).chain(iter::repeat_n(self.period, self.seasonal_d))
    }

    /// Differences `values`.
    ///
    /// # Errors
    ///
    /// [`ArimaError::InvalidOrder`] for seasonal differencing with period 0,
    /// and [`ArimaError::InsufficientData`] unless `values.len() > loss()`.
    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>, ArimaError> {
        self.check_period()?;
        let min = self.loss() + 1;
        if values.len() < min {
            return Err(ArimaError::InsufficientData {
                n: values.len(),
                min,
            });
        }
        let mut out = values.to_vec();
        for lag in self.lags() {
            out = difference(&out, lag);
        }
        Ok(out)
    }

    /// Rebuilds levels from values on the differenced scale.
    ///
    /// `future` continues the differenced version of `history`; the result
    /// continues `history` itself. Only the last `loss()` observations of
    /// `history` influence the result.
    ///
    /// # Errors
    ///
    /// [`ArimaError::InvalidOrder`] for seasonal differencing with period 0,
    /// and [`ArimaError::InsufficientData`] if `history` is shorter than
    /// `loss()`.
    pub fn integrate(&self, future: &[f64], history: &[f64]) -> Result<Vec<f64>, ArimaError> {
        self.check_period()?;
        let loss = self.loss();
        if history.len() < loss {
            return Err(ArimaError::InsufficientData {
                n: history.len(),
                min: loss,
            });
        }
        let tail = &history[history.len() - loss..];

        // Input of every differencing stage, computed from the history tail.
        let lags: Vec<usize> = self.lags().collect();
        let mut stages = Vec::with_capacity(lags.len());
        let mut current = tail.to_vec();
        for &lag in &lags {
            let next = difference(&current, lag);
            stages.push(current);
            current = next;
        }

        let mut out = future.to_vec();
        for (&lag, mut level) in lags.iter().zip(stages).rev() {
            let start = level.len();
            for (i, &value) in out.iter().enumerate() {
                let restored = value + level[start + i - lag];
                level.push(restored);
            }
            out = level.split_off(start);
        }
        Ok(out)
    }
}

/// Lag-`lag` difference `xₜ − xₜ₋ₗ`. Empty if `values` is not longer than `lag`.
pub fn difference(values: &[f64], lag: usize) -> Vec<f64> {
    (lag..values.len())
        .map(|t| values[t] - values[t - lag])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn regular_difference() {
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 1), vec![3.0, 5.0, 7.0]);
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 2), vec![8.0, 12.0]);
        assert!(difference(&[1.0], 3).is_empty());
    }

    #[test]
    fn second_difference_of_squares_is_constant() {
        let squares: Vec<f64> = (1..=6).map(|t| f64::from(t * t)).collect();
        let out = Differencer::new(2, 0, 1).apply(&squares).unwrap();
        assert_eq!(out, vec![2.0; 4]);
    }

    #[test]
    fn seasonal_after_regular() {
        let values: Vec<f64> = (0..10).map(|t| f64::from(t * t)).collect();
        let out = Differencer::new(1, 1, 4).apply(&values).unwrap();
        // (1-B) gives 2t-1, then (1-B⁴) gives a constant 8.
        assert_eq!(out, vec![8.0; 5]);
    }

    #[test]
    fn too_short_series() {
        let err = Differencer::new(1, 1, 4).apply(&[1.0; 5]).unwrap_err();
        assert!(matches!(err, ArimaError::InsufficientData { n: 5, min: 6 }));
        assert!(Differencer::new(1, 1, 4).apply(&[1.0; 6]).is_ok());
    }

    #[test]
    fn integrate_inverts_apply() {
        let values: Vec<f64> = (0..30)
            .map(|t| f64::from(t).sin() * 5.0 + 0.3 * f64::from(t))
            .collect();
        let diff = Differencer::new(1, 1, 4);
        let differenced = diff.apply(&values).unwrap();

        let split = 20;
        let future = &differenced[split - diff.loss()..];
        let rebuilt = diff.integrate(future, &values[..split]).unwrap();
        assert_eq!(rebuilt.len(), values.len() - split);
        for (a, b) in rebuilt.iter().zip(&values[split..]) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn integrate_without_differencing_is_identity() {
        let diff = Differencer::new(0, 0, 12);
        assert_eq!(diff.loss(), 0);
        assert_eq!(diff.integrate(&[1.0, 2.0], &[]).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn integrate_needs_context() {
        let err = Differencer::new(0, 1, 12)
            .integrate(&[1.0], &[0.0; 11])
            .unwrap_err();
        assert!(matches!(err, ArimaError::InsufficientData { n: 11, min: 12 }));
    }

    #[test]
    fn seasonal_difference_needs_a_period() {
        let diff = Differencer::new(0, 1, 0);
        let err = diff.integrate(&[1.0], &[5.0, 6.0]).unwrap_err();
        assert!(matches!(err, ArimaError::InvalidOrder { .. }));
        let err = diff.apply(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ArimaError::InvalidOrder { .. }));

        // Period 0 is harmless without seasonal differencing.
        assert_eq!(Differencer::new(1, 0, 0).apply(&[1.0, 3.0]).unwrap(), vec![2.0]);
    }
}
