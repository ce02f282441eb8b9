//! Lag-polynomial algebra.
//!
//! Polynomials are stored as coefficient vectors `c` with `c[i]` the
//! coefficient of `Bⁱ` and `c[0] = 1`. AR-style coefficient lists
//! (`φ` with polynomial `1 − Σ φᵢ Bⁱ`) are converted at the boundary.
//!
//! **Not part of the public API.**

/// Product of two polynomials.
pub(crate) fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `1 − Σ φᵢ B^(i·lag)` as a polynomial.
fn ar_polynomial(phi: &[f64], lag: usize) -> Vec<f64> {
    let mut poly = vec![0.0; phi.len() * lag + 1];
    poly[0] = 1.0;
    for (i, &c) in phi.iter().enumerate() {
        poly[(i + 1) * lag] = -c;
    }
    poly
}

/// `1 + Σ θⱼ B^(j·lag)` as a polynomial.
fn ma_polynomial(theta: &[f64], lag: usize) -> Vec<f64> {
    let mut poly = vec![0.0; theta.len() * lag + 1];
    poly[0] = 1.0;
    for (j, &c) in theta.iter().enumerate() {
        poly[(j + 1) * lag] = c;
    }
    poly
}

/// AR coefficients of `φ(B)·Φ(Bˢ)`, i.e. `φ*` with `1 − Σ φ*ₖ Bᵏ`.
pub(crate) fn expand_ar(ar: &[f64], seasonal_ar: &[f64], period: usize) -> Vec<f64> {
    let poly = multiply(&ar_polynomial(ar, 1), &ar_polynomial(seasonal_ar, period));
    poly[1..].iter().map(|c| -c).collect()
}

/// MA coefficients of `θ(B)·Θ(Bˢ)`, i.e. `θ*` with `1 + Σ θ*ₖ Bᵏ`.
pub(crate) fn expand_ma(ma: &[f64], seasonal_ma: &[f64], period: usize) -> Vec<f64> {
    let poly = multiply(&ma_polynomial(ma, 1), &ma_polynomial(seasonal_ma, period));
    poly[1..].to_vec()
}

/// AR coefficients of `φ*(B)·(1 − B)ᵈ·(1 − Bˢ)ᴰ`.
///
/// Treating the differencing operators as unit-root AR factors turns the
/// ARIMA model into a (non-stationary) ARMA whose ψ-weights give the
/// forecast error variance on the original scale.
pub(crate) fn integrate_ar(ar: &[f64], d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = ar_polynomial(ar, 1);
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    for _ in 0..seasonal_d {
        poly = multiply(&poly, &ar_polynomial(&[1.0], period));
    }
    poly[1..].iter().map(|c| -c).collect()
}

/// `true` if all roots of `1 − Σ φᵢ zⁱ` lie strictly outside the unit circle.
///
/// Runs the Levinson-Durbin recursion backwards (Schur-Cohn step-down):
/// the polynomial is stationary iff every reflection coefficient has
/// modulus below one.
pub(crate) fn is_stationary(phi: &[f64]) -> bool {
    if phi.iter().any(|c| !c.is_finite()) {
        return false;
    }
    let mut a = phi.to_vec();
    while let Some(&0.0) = a.last() {
        a.pop();
    }
    for k in (1..=a.len()).rev() {
        let kappa = a[k - 1];
        if kappa.abs() >= 1.0 {
            return false;
        }
        let denom = 1.0 - kappa * kappa;
        let prev: Vec<f64> = (0..k - 1)
            .map(|j| (a[j] + kappa * a[k - 2 - j]) / denom)
            .collect();
        a = prev;
    }
    true
}

/// `true` if all roots of `1 + Σ θⱼ zʲ` lie strictly outside the unit circle.
pub(crate) fn is_invertible(theta: &[f64]) -> bool {
    let negated: Vec<f64> = theta.iter().map(|c| -c).collect();
    is_stationary(&negated)
}

/// First `n` ψ-weights of the ARMA model `φ(B) xₜ = θ(B) eₜ`.
///
/// `ψ₀ = 1` and `ψⱼ = θⱼ + Σᵢ φᵢ ψⱼ₋ᵢ`, with `θⱼ = 0` beyond the MA order.
pub(crate) fn psi_weights(phi: &[f64], theta: &[f64], n: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(n);
    for j in 0..n {
        let value = if j == 0 {
            1.0
        } else {
            let ma = theta.get(j - 1).copied().unwrap_or(0.0);
            let ar: f64 = phi
                .iter()
                .take(j)
                .enumerate()
                .map(|(i, &c)| c * psi[j - 1 - i])
                .sum();
            ma + ar
        };
        psi.push(value);
    }
    psi
}

/// Maps partial autocorrelations in `(−1, 1)` to AR coefficients of a
/// stationary polynomial (forward Levinson-Durbin recursion).
#[cfg(test)]
pub(crate) fn from_partial_autocorrelations(r: &[f64]) -> Vec<f64> {
    let p = r.len();
    let mut phi = vec![0.0; p];
    let mut prev = vec![0.0; p];
    for k in 0..p {
        prev.copy_from_slice(&phi);
        phi[k] = r[k];
        for j in 0..k {
            phi[j] = prev[j] - r[k] * prev[k - 1 - j];
        }
    }
    phi
}
