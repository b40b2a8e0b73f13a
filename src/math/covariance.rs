//! Coefficient covariance estimators.
//!
//! Sandwich form `V = B M B` with bread `B = (X'X)⁻¹` and meat
//! `M = Σ_i ω_i x_i x_i'`, where ω depends on the variant:
//!
//! | kind | ω_i                | scale        |
//! |------|--------------------|--------------|
//! | HC0  | e_i²               | 1            |
//! | HC1  | e_i²               | n / (n - k)  |
//! | HC2  | e_i² / (1 - h_ii)  | 1            |
//! | HC3  | e_i² / (1 - h_ii)² | 1            |
//!
//! `classical` is `σ̂² B` with `σ̂² = e'e / (n - k)`.
//!
//! For 2SLS the caller passes the projected regressors `X̂` and residuals
//! computed with the original regressors.

use nalgebra::{DMatrix, DVector};

use crate::domain::CovarianceKind;
use crate::error::AppError;

/// Leverage this close to one makes HC2/HC3 undefined.
const LEVERAGE_EPS: f64 = 1e-10;

pub fn coefficient_covariance(
    x: &DMatrix<f64>,
    residuals: &DVector<f64>,
    bread: &DMatrix<f64>,
    kind: CovarianceKind,
) -> Result<DMatrix<f64>, AppError> {
    let n = x.nrows();
    let k = x.ncols();
    if residuals.len() != n {
        return Err(AppError::numeric(format!(
            "Residual length ({}) != design rows ({n}).",
            residuals.len()
        )));
    }
    if n <= k {
        return Err(AppError::numeric(format!(
            "No residual degrees of freedom (n={n}, k={k})."
        )));
    }
    let dof = (n - k) as f64;

    if kind == CovarianceKind::Classical {
        let sigma2 = residuals.norm_squared() / dof;
        return Ok(bread * sigma2);
    }

    let mut omega = Vec::with_capacity(n);
    for i in 0..n {
        let e2 = residuals[i] * residuals[i];
        let w = match kind {
            CovarianceKind::Hc0 | CovarianceKind::Hc1 => e2,
            CovarianceKind::Hc2 | CovarianceKind::Hc3 => {
                let one_minus_h = 1.0 - leverage(x, bread, i);
                if one_minus_h <= LEVERAGE_EPS {
                    return Err(AppError::numeric(format!(
                        "Observation {} has leverage 1; {kind} is undefined.",
                        i + 1
                    )));
                }
                if kind == CovarianceKind::Hc2 {
                    e2 / one_minus_h
                } else {
                    e2 / (one_minus_h * one_minus_h)
                }
            }
            CovarianceKind::Classical => unreachable!(),
        };
        omega.push(w);
    }

    // M = X' diag(ω) X
    let mut xw = x.clone();
    for (i, w) in omega.iter().enumerate() {
        xw.row_mut(i).scale_mut(*w);
    }
    let meat = x.transpose() * xw;

    let mut v = bread * meat * bread;
    if kind == CovarianceKind::Hc1 {
        v *= n as f64 / dof;
    }
    Ok(v)
}

/// Square roots of the diagonal (negative round-off clamps to zero).
pub fn standard_errors(cov: &DMatrix<f64>) -> Vec<f64> {
    (0..cov.nrows()).map(|j| cov[(j, j)].max(0.0).sqrt()).collect()
}

/// `h_ii = x_i' (X'X)⁻¹ x_i`.
fn leverage(x: &DMatrix<f64>, bread: &DMatrix<f64>, i: usize) -> f64 {
    let row = x.row(i);
    (row * bread * row.transpose())[(0, 0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> (DMatrix<f64>, DVector<f64>, DMatrix<f64>) {
        let x = DMatrix::from_row_slice(5, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0]);
        let e = DVector::from_row_slice(&[0.5, -0.3, 0.1, -0.6, 0.3]);
        let bread = (x.transpose() * &x).try_inverse().unwrap();
        (x, e, bread)
    }

    #[test]
    fn classical_matches_textbook_formula() {
        let (x, e, bread) = toy();
        let v = coefficient_covariance(&x, &e, &bread, CovarianceKind::Classical).unwrap();
        let sigma2 = e.norm_squared() / 3.0;
        // Var(slope) = σ² / Σ (x - x̄)² with Σ (x - x̄)² = 10.
        assert!((v[(1, 1)] - sigma2 / 10.0).abs() < 1e-12);
    }

    #[test]
    fn hc_variants_are_ordered() {
        let (x, e, bread) = toy();
        let se = |k| standard_errors(&coefficient_covariance(&x, &e, &bread, k).unwrap());
        let hc0 = se(CovarianceKind::Hc0);
        let hc1 = se(CovarianceKind::Hc1);
        let hc2 = se(CovarianceKind::Hc2);
        let hc3 = se(CovarianceKind::Hc3);
        for j in 0..2 {
            assert!(hc0[j] <= hc1[j]);
            assert!(hc0[j] <= hc2[j]);
            assert!(hc2[j] <= hc3[j]);
            let ratio = hc1[j] / hc0[j];
            assert!((ratio - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn hc0_single_regressor_closed_form() {
        let (x, e, bread) = toy();
        let v = coefficient_covariance(&x, &e, &bread, CovarianceKind::Hc0).unwrap();
        // Slope: Σ (x_i - x̄)² e_i² / (Σ (x_i - x̄)²)²
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let num: f64 = xs.iter().zip(e.iter()).map(|(xi, ei)| (xi - 2.0_f64).powi(2) * ei * ei).sum();
        assert!((v[(1, 1)] - num / 100.0).abs() < 1e-12);
    }

    #[test]
    fn no_degrees_of_freedom_is_error() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 1.0]);
        let e = DVector::from_row_slice(&[0.0, 0.0]);
        let bread = (x.transpose() * &x).try_inverse().unwrap();
        assert!(coefficient_covariance(&x, &e, &bread, CovarianceKind::Hc1).is_err());
    }
}
