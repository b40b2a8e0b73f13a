//! Instrumental Variables / Two-Stage Least Squares (2SLS).
//!
//! Structural equation:
//!
//! ```text
//! y = W δ + X β + u        W: intercept + exogenous controls
//!                          X: endogenous regressors
//! ```
//!
//! with excluded instruments `Z`. The full instrument set is `[W | Z]`;
//! `X̂ = P_[W|Z] X` and β̂ comes from regressing `y` on `[W | X̂]`. Residuals for
//! the covariance use the actual `X`, which is what separates a proper 2SLS
//! standard error from the one a hand-rolled second stage reports.
//!
//! # References
//!
//! - Wooldridge, *Econometric Analysis of Cross Section and Panel Data*, Ch. 5.

use serde::Serialize;
use tracing::{debug, info};

use crate::data::Frame;
use crate::domain::CovarianceKind;
use crate::error::AppError;
use crate::estimate::first_stage::{FirstStageDiagnostics, diagnose};
use crate::math::{Design, LinearFit, fit_projected, solve_least_squares};

/// Which frame columns play which role.
#[derive(Debug, Clone, Copy)]
pub struct IvSpec<'a> {
    pub dependent: &'a str,
    pub endogenous: &'a [&'a str],
    /// Exogenous controls; the intercept is always included.
    pub exogenous: &'a [&'a str],
    /// Excluded instruments.
    pub instruments: &'a [&'a str],
}

#[derive(Debug, Clone, Serialize)]
pub struct IvFit {
    pub fit: LinearFit,
    pub endogenous: Vec<String>,
    pub instruments: Vec<String>,
    pub first_stage: Vec<FirstStageDiagnostics>,
}

impl IvFit {
    /// Coefficient on the (first) endogenous regressor.
    pub fn endogenous_estimate(&self) -> Result<f64, AppError> {
        let name = self
            .endogenous
            .first()
            .ok_or_else(|| AppError::numeric("IV fit has no endogenous regressor."))?;
        self.fit.estimate(name)
    }
}

pub fn iv_2sls(frame: &Frame, spec: &IvSpec<'_>, covariance: CovarianceKind) -> Result<IvFit, AppError> {
    let k_endog = spec.endogenous.len();
    let m = spec.instruments.len();
    if k_endog == 0 {
        return Err(AppError::numeric("Must have at least 1 endogenous regressor."));
    }
    if m < k_endog {
        return Err(AppError::numeric(format!(
            "Under-identified: {m} instruments < {k_endog} endogenous regressors."
        )));
    }

    let y = frame.column(spec.dependent)?;
    let exog = Design::from_frame(frame, spec.exogenous)?;

    let mut z_full = exog.clone();
    for name in spec.instruments {
        z_full.push(*name, frame.column(name)?.to_vec())?;
    }
    let z_mat = z_full.matrix();

    let mut x_hat = exog.clone();
    let mut x_orig = exog.clone();
    let mut first_stage = Vec::with_capacity(k_endog);

    for name in spec.endogenous {
        let values = frame.column(name)?;
        let target = nalgebra::DVector::from_column_slice(values);
        let gamma = solve_least_squares(&z_mat, &target).ok_or_else(|| {
            AppError::numeric(format!("Instrument matrix singular projecting '{name}'."))
        })?;
        let projected = &z_mat * gamma;

        x_hat.push(*name, projected.iter().copied().collect())?;
        x_orig.push(*name, values.to_vec())?;
        first_stage.push(diagnose(name, values, &exog, &z_full, k_endog, covariance)?);
    }

    debug!(
        n = frame.n_rows(),
        k_exog = exog.n_cols(),
        k_endog,
        m,
        "2SLS designs assembled"
    );

    let fit = fit_projected(
        spec.dependent,
        y,
        x_orig.names(),
        &x_hat.matrix(),
        &x_orig.matrix(),
        covariance,
    )?;

    for fs in &first_stage {
        info!(
            endogenous = %fs.endogenous,
            f = fs.f_stat,
            f_robust = fs.f_stat_robust,
            "first stage"
        );
    }

    Ok(IvFit {
        fit,
        endogenous: spec.endogenous.iter().map(|s| s.to_string()).collect(),
        instruments: spec.instruments.iter().map(|s| s.to_string()).collect(),
        first_stage,
    })
}
