//! Endogeneity checks for log price.
//!
//! Two regressions-on-residuals:
//!
//! - **Residual test.** Fit `lpacks ~ lrprice + controls` by OLS, keep the
//!   residuals, then regress `lpacks` on those residuals alone. A significant
//!   slope is read as price being correlated with the demand error.
//! - **Control-function test** (Durbin–Wu–Hausman). Fit the first stage
//!   `lrprice ~ salestax + controls`, add its residual `v̂` to the structural
//!   OLS and t-test the coefficient on `v̂`. Under exogeneity it is zero.

use serde::Serialize;
use tracing::info;

use crate::data::{Frame, cols};
use crate::domain::{Coefficient, CovarianceKind};
use crate::error::AppError;
use crate::math::{Design, LinearFit, ols};

/// Significance level used for the verdicts.
pub const ALPHA: f64 = 0.05;

const FIRST_STAGE_RESID: &str = "v_hat";

#[derive(Debug, Clone, Serialize)]
pub struct ResidualTest {
    pub structural: LinearFit,
    pub test: LinearFit,
    pub residual_coefficient: Coefficient,
    pub endogenous: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlFunctionTest {
    pub augmented: LinearFit,
    pub residual_coefficient: Coefficient,
    pub endogenous: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndogeneityReport {
    pub residual_test: ResidualTest,
    pub control_function: ControlFunctionTest,
}

pub fn test_endogeneity(frame: &mut Frame, covariance: CovarianceKind) -> Result<EndogeneityReport, AppError> {
    let residual_test = residual_test(frame, covariance)?;
    let control_function = control_function_test(frame, covariance)?;
    Ok(EndogeneityReport {
        residual_test,
        control_function,
    })
}

/// Appends the structural OLS residuals as `ols_resid`.
pub fn residual_test(frame: &mut Frame, covariance: CovarianceKind) -> Result<ResidualTest, AppError> {
    let mut regressors = vec![cols::LRPRICE];
    regressors.extend_from_slice(&cols::CONTROLS);
    let design = Design::from_frame(frame, &regressors)?;
    let structural = ols(cols::LPACKS, frame.column(cols::LPACKS)?, &design, covariance)?;

    frame.add_column(cols::OLS_RESID, structural.residuals.clone())?;

    let test_design = Design::from_frame(frame, &[cols::OLS_RESID])?;
    let test = ols(cols::LPACKS, frame.column(cols::LPACKS)?, &test_design, covariance)?;
    let residual_coefficient = test
        .coefficient(cols::OLS_RESID)
        .cloned()
        .ok_or_else(|| AppError::numeric("Residual coefficient missing."))?;
    let endogenous = residual_coefficient.is_significant(ALPHA);

    info!(
        coef = residual_coefficient.estimate,
        p = residual_coefficient.p_value,
        endogenous,
        "residual test"
    );

    Ok(ResidualTest {
        structural,
        test,
        residual_coefficient,
        endogenous,
    })
}

/// Durbin–Wu–Hausman via the first-stage residual.
pub fn control_function_test(
    frame: &Frame,
    covariance: CovarianceKind,
) -> Result<ControlFunctionTest, AppError> {
    let mut first_regressors: Vec<&str> = cols::CONTROLS.to_vec();
    first_regressors.push(cols::SALESTAX);
    let first_design = Design::from_frame(frame, &first_regressors)?;
    let first = ols(cols::LRPRICE, frame.column(cols::LRPRICE)?, &first_design, covariance)?;

    let mut regressors = vec![cols::LRPRICE];
    regressors.extend_from_slice(&cols::CONTROLS);
    let mut design = Design::from_frame(frame, &regressors)?;
    design.push(FIRST_STAGE_RESID, first.residuals)?;
    let augmented = ols(cols::LPACKS, frame.column(cols::LPACKS)?, &design, covariance)?;

    let residual_coefficient = augmented
        .coefficient(FIRST_STAGE_RESID)
        .cloned()
        .ok_or_else(|| AppError::numeric("Control-function coefficient missing."))?;
    let endogenous = residual_coefficient.is_significant(ALPHA);

    info!(
        coef = residual_coefficient.estimate,
        p = residual_coefficient.p_value,
        endogenous,
        "control-function test"
    );

    Ok(ControlFunctionTest {
        augmented,
        residual_coefficient,
        endogenous,
    })
}
