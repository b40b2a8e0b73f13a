//! Rendering of a finished analysis.
//!
//! Text output is assembled from the table helpers in [`format`]; JSON is the
//! serde view of the same [`Analysis`] value.

pub mod format;

pub use format::*;

use crate::app::pipeline::{Analysis, Description};
use crate::endogeneity::ALPHA;
use crate::error::AppError;

pub fn format_description(desc: &Description) -> String {
    let mut out = section(&format!("CigarettesSW {} ({})", desc.year, desc.source));
    out.push_str(&format!("rows: {}\n\n", desc.n_obs));
    out.push_str(&format_summary(&desc.summary));
    out
}

/// The full text report, in pipeline order.
pub fn format_analysis(a: &Analysis) -> String {
    let est = &a.estimation;
    let mut out = String::new();

    out.push_str(&section(&format!(
        "IV analysis of cigarette demand, {} ({} states, {} standard errors)",
        a.year,
        a.n_obs,
        a.covariance.display_name()
    )));
    out.push_str(&format!("data: {}\n\n", a.source));
    out.push_str(&format_summary(&a.summary));

    out.push('\n');
    out.push_str(&section("Instrument relevance"));
    out.push_str(&format!(
        "corr(salestax, price) = {:.4}\n",
        est.instrument_price_correlation
    ));
    out.push_str(if est.instrument_price_correlation > 0.0 {
        "Higher sales taxes go with higher prices: the instrument is relevant.\n"
    } else {
        "Sales tax is not positively correlated with price: the instrument looks irrelevant.\n"
    });

    out.push('\n');
    out.push_str(&section("OLS (no instrument)"));
    out.push_str(&format_fit(&est.naive_ols));

    out.push('\n');
    out.push_str(&section("Manual 2SLS: first stage"));
    out.push_str(&format_fit(&est.manual.first_stage));
    out.push('\n');
    out.push_str(&section("Manual 2SLS: second stage"));
    out.push_str(&format_fit(&est.manual.second_stage));
    out.push_str("Standard errors above ignore that the fitted price was estimated.\n");

    out.push('\n');
    out.push_str(&section("IV (2SLS)"));
    out.push_str(&format_fit(&est.iv.fit));
    for fs in &est.iv.first_stage {
        out.push_str(&format_first_stage(fs));
    }
    match est.manual_direct_gap() {
        Ok(gap) => out.push_str(&format!("|manual - direct| = {gap:.2e}\n")),
        Err(err) => out.push_str(&format!("manual/direct comparison unavailable: {err}\n")),
    }

    out.push('\n');
    out.push_str(&section("IV (2SLS) with controls"));
    out.push_str(&format_fit(&est.iv_controls.fit));
    for fs in &est.iv_controls.first_stage {
        out.push_str(&format_first_stage(fs));
    }

    out.push('\n');
    out.push_str(&section("Endogeneity of price"));
    let rt = &a.endogeneity.residual_test;
    out.push_str("Residual test (lpacks ~ ols_resid):\n");
    out.push_str(&format_coefficients(std::slice::from_ref(&rt.residual_coefficient)));
    out.push_str(&verdict_line(rt.endogenous));
    let cf = &a.endogeneity.control_function;
    out.push_str("Control-function test (first-stage residual in the structural equation):\n");
    out.push_str(&format_coefficients(std::slice::from_ref(&cf.residual_coefficient)));
    out.push_str(&verdict_line(cf.endogenous));

    out.push('\n');
    out.push_str(&section("Interpretation"));
    out.push_str(&interpretation(a));
    out
}

pub fn to_json(a: &Analysis) -> Result<String, AppError> {
    serde_json::to_string_pretty(a)
        .map_err(|e| AppError::internal(format!("Failed to serialize analysis: {e}")))
}

fn verdict_line(endogenous: bool) -> String {
    if endogenous {
        format!("Significant at {ALPHA}: evidence that price is endogenous.\n")
    } else {
        format!("Not significant at {ALPHA}: no evidence of endogeneity.\n")
    }
}

fn interpretation(a: &Analysis) -> String {
    let est = &a.estimation;
    let mut out = String::new();
    let elasticity = |r: Result<f64, AppError>| r.map(|v| format!("{v:.3}")).unwrap_or_else(|_| "NA".to_string());

    out.push_str(&format!(
        "OLS price elasticity:            {}\n",
        elasticity(est.naive_ols.estimate(crate::data::cols::LRPRICE))
    ));
    out.push_str(&format!(
        "IV price elasticity:             {}\n",
        elasticity(est.iv.endogenous_estimate())
    ));
    out.push_str(&format!(
        "IV price elasticity w/ controls: {}\n",
        elasticity(est.iv_controls.endogenous_estimate())
    ));
    if let Ok(b) = est.iv.endogenous_estimate() {
        out.push_str(&format!(
            "A 1% rise in the real price changes packs per capita by about {b:.2}%.\n"
        ));
        if b < -1.0 {
            out.push_str("Demand is price elastic.\n");
        } else if b < 0.0 {
            out.push_str("Demand is price inelastic.\n");
        }
    }
    out
}
