//! First-stage strength diagnostics.
//!
//! For each endogenous regressor `x_e` we compare
//!
//! - unrestricted: `x_e ~ exog + excluded instruments`
//! - restricted:   `x_e ~ exog`
//!
//! and report the classical partial F, a Wald F built from the configured
//! (robust) covariance, R² and partial R².
//!
//! References: Stock & Yogo (2005), "Testing for weak instruments in linear
//! IV regression", Table 5.2 (10% maximal IV size, one endogenous regressor).

use serde::Serialize;

use crate::domain::CovarianceKind;
use crate::error::AppError;
use crate::math::{Design, LinearFit, ols};

/// Stock–Yogo 10% maximal-size critical values, one endogenous regressor,
/// indexed by the number of excluded instruments (1-based).
const STOCK_YOGO_10: [f64; 5] = [16.38, 19.93, 22.30, 24.58, 26.87];

#[derive(Debug, Clone, Serialize)]
pub struct FirstStageDiagnostics {
    pub endogenous: String,
    /// Homoskedastic partial F of the excluded instruments.
    pub f_stat: f64,
    /// Wald F of the excluded instruments using the run's covariance.
    pub f_stat_robust: f64,
    pub r_squared: f64,
    pub partial_r_squared: f64,
    pub n_instruments: usize,
    /// `None` when no tabulated value exists for this shape.
    pub stock_yogo_10: Option<f64>,
}

impl FirstStageDiagnostics {
    pub fn passes_stock_yogo_10(&self) -> Option<bool> {
        self.stock_yogo_10.map(|cv| self.f_stat > cv)
    }
}

/// Diagnose one endogenous regressor.
///
/// `instruments_full` is `exog` followed by the excluded instruments.
pub fn diagnose(
    endogenous: &str,
    values: &[f64],
    exog: &Design,
    instruments_full: &Design,
    n_endogenous: usize,
    covariance: CovarianceKind,
) -> Result<FirstStageDiagnostics, AppError> {
    let m = instruments_full.n_cols().saturating_sub(exog.n_cols());
    if m == 0 {
        return Err(AppError::numeric("No excluded instruments."));
    }

    let unrestricted = ols(endogenous, values, instruments_full, covariance)?;
    let restricted = ols(endogenous, values, exog, CovarianceKind::Classical)?;

    let rss_u = unrestricted.rss;
    let rss_r = restricted.rss;
    let f_stat = if rss_u > 0.0 && unrestricted.df_resid > 0 {
        ((rss_r - rss_u) / m as f64) / (rss_u / unrestricted.df_resid as f64)
    } else {
        f64::NAN
    };
    let partial_r_squared = if rss_r > 0.0 { (rss_r - rss_u) / rss_r } else { 0.0 };

    let stock_yogo_10 = if n_endogenous == 1 {
        STOCK_YOGO_10.get(m - 1).copied()
    } else {
        None
    };

    Ok(FirstStageDiagnostics {
        endogenous: endogenous.to_string(),
        f_stat,
        f_stat_robust: wald_f(&unrestricted, m),
        r_squared: unrestricted.r_squared,
        partial_r_squared,
        n_instruments: m,
        stock_yogo_10,
    })
}

/// `γ' V⁻¹ γ / m` over the last `m` coefficients; NaN if the block is singular.
fn wald_f(fit: &LinearFit, m: usize) -> f64 {
    let k = fit.coefficients.len();
    let start = k - m;
    let gamma = nalgebra::DVector::from_iterator(
        m,
        fit.coefficients[start..].iter().map(|c| c.estimate),
    );
    let block = fit.vcov.view((start, start), (m, m)).into_owned();
    match block.try_inverse() {
        Some(inv) => (gamma.transpose() * inv * &gamma)[(0, 0)] / m as f64,
        None => f64::NAN,
    }
}
