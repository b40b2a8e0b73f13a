//! Least squares fitting.
//!
//! Every regression in the analysis reduces to
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! solved by SVD. The SVD doubles as the rank check: a design whose smallest
//! singular value is negligible relative to the largest is rejected instead of
//! silently returning a minimum-norm solution.
//!
//! 2SLS reuses the same machinery with two designs: β and the bread of the
//! covariance come from the projected regressors `X̂`, residuals from the
//! original regressors `X`.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use crate::domain::{Coefficient, CovarianceKind};
use crate::error::AppError;
use crate::math::covariance::{coefficient_covariance, standard_errors};
use crate::math::design::Design;

/// Relative singular-value cutoff for declaring a design rank deficient.
const RANK_TOL: f64 = 1e-10;

/// A fitted linear model with its coefficient table.
#[derive(Debug, Clone, Serialize)]
pub struct LinearFit {
    pub dependent: String,
    pub coefficients: Vec<Coefficient>,
    pub covariance: CovarianceKind,
    pub n_obs: usize,
    pub df_resid: usize,
    pub r_squared: f64,
    pub rss: f64,
    /// Full coefficient covariance, same order as `coefficients`.
    #[serde(skip)]
    pub vcov: DMatrix<f64>,
    #[serde(skip)]
    pub fitted: Vec<f64>,
    #[serde(skip)]
    pub residuals: Vec<f64>,
}

impl LinearFit {
    pub fn coefficient(&self, term: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.term == term)
    }

    pub fn estimate(&self, term: &str) -> Result<f64, AppError> {
        self.coefficient(term)
            .map(|c| c.estimate)
            .ok_or_else(|| AppError::numeric(format!("No coefficient named '{term}'.")))
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the design is rank deficient or the solution is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    let s_max = svd.singular_values.max();
    let s_min = svd.singular_values.min();
    if !(s_max.is_finite() && s_max > 0.0) || s_min <= RANK_TOL * s_max {
        return None;
    }

    let beta = svd.solve(y, RANK_TOL * s_max).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

/// Ordinary least squares of `y` on `design`.
pub fn ols(
    dependent: &str,
    y: &[f64],
    design: &Design,
    covariance: CovarianceKind,
) -> Result<LinearFit, AppError> {
    let x = design.matrix();
    fit_projected(dependent, y, design.names(), &x, &x, covariance)
}

/// Least squares of `y` on `x_hat`, residuals against `x`.
///
/// With `x_hat == x` this is OLS. With `x_hat = P_Z x` it is 2SLS.
pub(crate) fn fit_projected(
    dependent: &str,
    y: &[f64],
    names: &[String],
    x_hat: &DMatrix<f64>,
    x: &DMatrix<f64>,
    covariance: CovarianceKind,
) -> Result<LinearFit, AppError> {
    let n = x.nrows();
    let k = x.ncols();
    if n == 0 {
        return Err(AppError::empty(format!("No observations to regress '{dependent}' on.")));
    }
    if y.len() != n || x_hat.shape() != x.shape() || names.len() != k {
        return Err(AppError::numeric(format!(
            "Dimension mismatch fitting '{dependent}': y={}, X={}x{k}, names={}.",
            y.len(),
            n,
            names.len()
        )));
    }
    if n <= k {
        return Err(AppError::numeric(format!(
            "Too few observations for '{dependent}': n={n}, k={k}."
        )));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(AppError::numeric(format!("'{dependent}' has non-finite values.")));
    }

    let y_vec = DVector::from_column_slice(y);
    let beta = solve_least_squares(x_hat, &y_vec).ok_or_else(|| {
        AppError::numeric(format!(
            "Design for '{dependent}' is singular or rank deficient ({}).",
            names.join(", ")
        ))
    })?;
    let bread = (x_hat.transpose() * x_hat)
        .try_inverse()
        .ok_or_else(|| AppError::numeric(format!("X'X singular for '{dependent}'.")))?;

    let fitted = x * &beta;
    let resid = &y_vec - &fitted;
    let rss = resid.norm_squared();

    let mean = y.iter().sum::<f64>() / n as f64;
    let tss: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { 0.0 };

    let cov = coefficient_covariance(x_hat, &resid, &bread, covariance)?;
    let se = standard_errors(&cov);
    let df_resid = n - k;

    let coefficients = names
        .iter()
        .zip(beta.iter())
        .zip(se)
        .map(|((term, &estimate), std_error)| {
            let t_value = estimate / std_error;
            Coefficient {
                term: term.clone(),
                estimate,
                std_error,
                t_value,
                p_value: two_sided_p(t_value, df_resid),
            }
        })
        .collect();

    debug!(dependent, n, k, rss, r_squared, cov = %covariance, "fitted linear model");

    Ok(LinearFit {
        dependent: dependent.to_string(),
        coefficients,
        covariance,
        n_obs: n,
        df_resid,
        r_squared,
        rss,
        vcov: cov,
        fitted: fitted.iter().copied().collect(),
        residuals: resid.iter().copied().collect(),
    })
}

/// Two-sided Student-t p-value; NaN when undefined.
pub fn two_sided_p(t: f64, df: usize) -> f64 {
    if df == 0 || t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df as f64) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn collinear_design_is_rejected() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_least_squares(&x, &y).is_none());

        let mut d = Design::intercept(3);
        d.push("twice", vec![2.0, 2.0, 2.0]).unwrap();
        let err = ols("y", &[1.0, 2.0, 3.0], &d, CovarianceKind::Hc1).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NUMERIC);
    }

    #[test]
    fn ols_recovers_line_and_table() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let noise = [0.1, -0.2, 0.05, 0.0, -0.1];
        let y: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| 1.5 - 0.5 * x + noise[i % noise.len()])
            .collect();
        let mut d = Design::intercept(xs.len());
        d.push("x", xs).unwrap();

        let fit = ols("y", &y, &d, CovarianceKind::Hc1).unwrap();
        assert_eq!(fit.n_obs, 20);
        assert_eq!(fit.df_resid, 18);
        assert!((fit.estimate("x").unwrap() + 0.5).abs() < 0.02);
        assert!((fit.estimate("const").unwrap() - 1.5).abs() < 0.2);
        assert!(fit.r_squared > 0.99);
        let slope = fit.coefficient("x").unwrap();
        assert!(slope.p_value < 1e-6);
        assert!((slope.t_value - slope.estimate / slope.std_error).abs() < 1e-12);

        // Residuals are orthogonal to the regressors.
        let sum_resid: f64 = fit.residuals.iter().sum();
        assert!(sum_resid.abs() < 1e-9);
    }

    #[test]
    fn p_values_behave() {
        assert!((two_sided_p(0.0, 10) - 1.0).abs() < 1e-12);
        // t_{0.975, 10} ≈ 2.228
        assert!((two_sided_p(2.228, 10) - 0.05).abs() < 1e-3);
        assert!(two_sided_p(1.0, 0).is_nan());
        assert_eq!(two_sided_p(f64::INFINITY, 5), 0.0);
    }
}
