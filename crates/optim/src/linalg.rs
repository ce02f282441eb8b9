//! Dense symmetric linear algebra for small parameter dimensions.

use ndarray::Array2;

/// Lower-triangular Cholesky factor of a symmetric positive-definite matrix.
///
/// Returns `None` when the matrix is not square, not finite, or not
/// numerically positive definite.
pub fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let (n, m) = a.dim();
    if n != m {
        return None;
    }
    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let partial: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - partial;
                if !diag.is_finite() || diag <= a[[i, i]].abs() * 1e-14 {
                    return None;
                }
                l[[i, i]] = diag.sqrt();
            } else {
                let value = (a[[i, j]] - partial) / l[[j, j]];
                if !value.is_finite() {
                    return None;
                }
                l[[i, j]] = value;
            }
        }
    }
    Some(l)
}

/// Inverse of a symmetric positive-definite matrix via its Cholesky factor.
pub fn invert_spd(a: &Array2<f64>) -> Option<Array2<f64>> {
    let l = cholesky(a)?;
    let n = l.nrows();

    // L⁻¹ by forward substitution, column by column.
    let mut l_inv = Array2::zeros((n, n));
    for col in 0..n {
        for i in col..n {
            let rhs = if i == col { 1.0 } else { 0.0 };
            let partial: f64 = (col..i).map(|k| l[[i, k]] * l_inv[[k, col]]).sum();
            l_inv[[i, col]] = (rhs - partial) / l[[i, i]];
        }
    }

    // A⁻¹ = L⁻ᵀ L⁻¹
    let inv = l_inv.t().dot(&l_inv);
    Some(inv)
}
