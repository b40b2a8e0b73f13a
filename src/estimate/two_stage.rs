//! Two-stage least squares by hand: two OLS regressions.
//!
//! The point estimate equals the direct 2SLS estimate. The second-stage
//! standard errors do not: they are built from `y - X̂β̂` instead of
//! `y - Xβ̂` and ignore that `X̂` was estimated.

use serde::Serialize;
use tracing::info;

use crate::data::Frame;
use crate::domain::CovarianceKind;
use crate::error::AppError;
use crate::math::{Design, LinearFit, ols};

#[derive(Debug, Clone, Serialize)]
pub struct ManualTwoStage {
    pub first_stage: LinearFit,
    pub second_stage: LinearFit,
    /// Frame column holding the first-stage fitted values.
    pub fitted_column: String,
}

impl ManualTwoStage {
    pub fn endogenous_estimate(&self) -> Result<f64, AppError> {
        self.second_stage.estimate(&self.fitted_column)
    }
}

/// Name of the column the first stage appends for `endogenous`.
pub fn fitted_column_name(endogenous: &str) -> String {
    format!("{endogenous}_hat")
}

/// Run the first stage, append its fitted values to `frame`, run the second.
pub fn manual_two_stage(
    frame: &mut Frame,
    dependent: &str,
    endogenous: &str,
    instruments: &[&str],
    controls: &[&str],
    covariance: CovarianceKind,
) -> Result<ManualTwoStage, AppError> {
    let mut first_regressors: Vec<&str> = controls.to_vec();
    first_regressors.extend_from_slice(instruments);
    let first_design = Design::from_frame(frame, &first_regressors)?;
    let first_stage = ols(endogenous, frame.column(endogenous)?, &first_design, covariance)?;

    let fitted_column = fitted_column_name(endogenous);
    frame.add_column(fitted_column.clone(), first_stage.fitted.clone())?;

    let mut second_regressors: Vec<&str> = controls.to_vec();
    second_regressors.push(&fitted_column);
    let second_design = Design::from_frame(frame, &second_regressors)?;
    let second_stage = ols(dependent, frame.column(dependent)?, &second_design, covariance)?;

    info!(
        first_stage_r2 = first_stage.r_squared,
        estimate = second_stage.estimate(&fitted_column)?,
        "manual two-stage fit"
    );

    Ok(ManualTwoStage {
        first_stage,
        second_stage,
        fitted_column,
    })
}
