//! End-to-end checks of the analysis on the bundled CigarettesSW data.

use ivcig::app::pipeline::{prepare_frame, run_analysis};
use ivcig::data::cols;
use ivcig::domain::{AnalysisConfig, CovarianceKind};
use ivcig::estimate::AGREEMENT_TOL;
use ivcig::report::{format_analysis, to_json};

fn analysis_1995() -> ivcig::app::pipeline::Analysis {
    run_analysis(&AnalysisConfig::default()).unwrap()
}

#[test]
fn cross_section_has_48_states() {
    let frame = prepare_frame(&AnalysisConfig::default()).unwrap();
    assert_eq!(frame.n_rows(), 48);
    for name in [cols::RPRICE, cols::SALESTAX, cols::LPACKS, cols::LRPRICE, cols::LPOP, cols::LRINCOME] {
        let values = frame.column(name).unwrap();
        assert_eq!(values.len(), 48);
        assert!(values.iter().all(|v| v.is_finite()), "{name} has non-finite values");
    }
}

#[test]
fn manual_and_direct_2sls_agree() {
    let a = analysis_1995();
    let est = &a.estimation;
    assert!(est.manual_direct_gap().unwrap() < AGREEMENT_TOL);

    let se_manual = est.manual.second_stage.coefficient(cols::LRPRICE_HAT).unwrap().std_error;
    let se_direct = est.iv.fit.coefficient(cols::LRPRICE).unwrap().std_error;
    assert!((se_manual - se_direct).abs() > 1e-6);
}

#[test]
fn instrument_is_relevant() {
    let a = analysis_1995();
    let est = &a.estimation;
    assert!(est.instrument_price_correlation > 0.0);
    assert!(est.manual.first_stage.estimate(cols::SALESTAX).unwrap() > 0.0);
    assert!(est.iv.first_stage[0].f_stat > 10.0);
}

#[test]
fn demand_slopes_down() {
    let a = analysis_1995();
    let b = a.estimation.iv.endogenous_estimate().unwrap();
    assert!(b < -0.9 && b > -2.0, "IV elasticity {b}");
    assert!(a.estimation.naive_ols.estimate(cols::LRPRICE).unwrap() < 0.0);
}

/// Stock & Watson's 1995 estimates: ln(Q) = 9.72 - 1.08 ln(P̂).
#[test]
fn textbook_1995_estimates() {
    let a = analysis_1995();
    let b = a.estimation.iv.endogenous_estimate().unwrap();
    assert!((b + 1.08).abs() < 0.01, "IV elasticity {b}");

    let second = &a.estimation.manual.second_stage;
    let slope = second.estimate(cols::LRPRICE_HAT).unwrap();
    let intercept = second.estimate("const").unwrap();
    assert!((slope + 1.08).abs() < 0.01, "second-stage slope {slope}");
    assert!((intercept - 9.72).abs() < 0.01, "second-stage intercept {intercept}");
}

#[test]
fn controls_move_the_estimate() {
    let a = analysis_1995();
    let plain = a.estimation.iv.endogenous_estimate().unwrap();
    let controlled = a.estimation.iv_controls.endogenous_estimate().unwrap();
    assert!((plain - controlled).abs() > 1e-6);
    assert!(controlled < 0.0);
    assert_eq!(a.estimation.iv_controls.fit.n_obs, 48);
    assert!(a
        .estimation
        .iv_controls
        .fit
        .coefficients
        .iter()
        .all(|c| c.estimate.is_finite() && c.std_error.is_finite()));
}

#[test]
fn residual_test_is_significant() {
    let a = analysis_1995();
    let rt = &a.endogeneity.residual_test;
    assert!(rt.residual_coefficient.p_value < 0.05);
    assert!(rt.endogenous);
}

#[test]
fn covariance_choice_only_changes_errors() {
    let hc1 = analysis_1995();
    let classical = run_analysis(&AnalysisConfig {
        covariance: CovarianceKind::Classical,
        ..AnalysisConfig::default()
    })
    .unwrap();
    let b1 = hc1.estimation.iv.endogenous_estimate().unwrap();
    let b2 = classical.estimation.iv.endogenous_estimate().unwrap();
    assert!((b1 - b2).abs() < 1e-12);
    let se1 = hc1.estimation.iv.fit.coefficient(cols::LRPRICE).unwrap().std_error;
    let se2 = classical.estimation.iv.fit.coefficient(cols::LRPRICE).unwrap().std_error;
    assert!((se1 - se2).abs() > 1e-9);
}

#[test]
fn earlier_year_also_runs() {
    let a = run_analysis(&AnalysisConfig {
        year: 1985,
        ..AnalysisConfig::default()
    })
    .unwrap();
    assert_eq!(a.n_obs, 48);
    assert!(a.estimation.manual_direct_gap().unwrap() < AGREEMENT_TOL);
}

#[test]
fn reports_render() {
    let a = analysis_1995();
    let text = format_analysis(&a);
    for needle in ["Instrument relevance", "IV (2SLS) with controls", "Residual test", "Interpretation"] {
        assert!(text.contains(needle), "missing section {needle}");
    }

    let json: serde_json::Value = serde_json::from_str(&to_json(&a).unwrap()).unwrap();
    assert_eq!(json["year"], 1995);
    assert_eq!(json["covariance"], "hc1");
    assert!(json["estimation"]["iv"]["fit"]["coefficients"].is_array());
}
