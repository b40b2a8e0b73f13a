//! Price-elasticity estimation for one cross-section.
//!
//! Order of work, all on the same frame:
//! 1. corr(salestax, price)                      instrument relevance
//! 2. OLS  lpacks ~ lrprice                      biased benchmark
//! 3. OLS  lrprice ~ salestax, then
//!    OLS  lpacks ~ lrprice_hat                  manual 2SLS
//! 4. 2SLS lpacks ~ [lrprice ~ salestax]         direct IV
//! 5. 2SLS with lpop + lrincome in both stages   IV with controls

pub mod first_stage;
pub mod iv;
pub mod two_stage;

pub use first_stage::*;
pub use iv::*;
pub use two_stage::*;

use serde::Serialize;
use tracing::{info, warn};

use crate::data::{Frame, cols};
use crate::domain::CovarianceKind;
use crate::error::AppError;
use crate::math::{Design, LinearFit, ols, pearson_correlation};

/// Manual and direct 2SLS must agree to this tolerance.
pub const AGREEMENT_TOL: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
pub struct Estimation {
    pub instrument_price_correlation: f64,
    pub naive_ols: LinearFit,
    pub manual: ManualTwoStage,
    pub iv: IvFit,
    pub iv_controls: IvFit,
}

impl Estimation {
    /// Absolute gap between manual and direct 2SLS price coefficients.
    pub fn manual_direct_gap(&self) -> Result<f64, AppError> {
        Ok((self.manual.endogenous_estimate()? - self.iv.endogenous_estimate()?).abs())
    }
}

/// Run every estimator on a single-year frame with derived columns present.
///
/// Appends the first-stage fitted values (`lrprice_hat`) to `frame`.
pub fn estimate(frame: &mut Frame, covariance: CovarianceKind) -> Result<Estimation, AppError> {
    let instrument_price_correlation =
        pearson_correlation(frame.column(cols::SALESTAX)?, frame.column(cols::PRICE)?)?;
    info!(corr = instrument_price_correlation, "instrument relevance");

    let naive_design = Design::from_frame(frame, &[cols::LRPRICE])?;
    let naive_ols = ols(cols::LPACKS, frame.column(cols::LPACKS)?, &naive_design, covariance)?;

    let manual = manual_two_stage(
        frame,
        cols::LPACKS,
        cols::LRPRICE,
        &[cols::SALESTAX],
        &[],
        covariance,
    )?;

    let iv = iv_2sls(
        frame,
        &IvSpec {
            dependent: cols::LPACKS,
            endogenous: &[cols::LRPRICE],
            exogenous: &[],
            instruments: &[cols::SALESTAX],
        },
        covariance,
    )?;

    let iv_controls = iv_2sls(
        frame,
        &IvSpec {
            dependent: cols::LPACKS,
            endogenous: &[cols::LRPRICE],
            exogenous: &cols::CONTROLS,
            instruments: &[cols::SALESTAX],
        },
        covariance,
    )?;

    let est = Estimation {
        instrument_price_correlation,
        naive_ols,
        manual,
        iv,
        iv_controls,
    };

    let gap = est.manual_direct_gap()?;
    if gap > AGREEMENT_TOL {
        warn!(gap, "manual and direct 2SLS estimates disagree");
    }
    info!(
        iv = est.iv.endogenous_estimate()?,
        iv_controls = est.iv_controls.endogenous_estimate()?,
        "price elasticity"
    );
    Ok(est)
}
