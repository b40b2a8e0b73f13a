//! The analysis pipeline shared by `run` and `describe`.
//!
//! load -> filter year -> derive real variables -> derive logs -> estimate -> endogeneity

use serde::Serialize;
use tracing::info;

use crate::data::{Frame, cols, derive_log_columns, derive_real_variables, load_panel};
use crate::domain::{AnalysisConfig, ColumnSummary, CovarianceKind};
use crate::endogeneity::{EndogeneityReport, test_endogeneity};
use crate::error::AppError;
use crate::estimate::{Estimation, estimate};
use crate::math::summarize;

/// Columns shown in the summary table.
pub const SUMMARY_COLUMNS: [&str; 9] = [
    cols::PACKS,
    cols::PRICE,
    cols::RPRICE,
    cols::SALESTAX,
    cols::CPI,
    cols::POPULATION,
    cols::INCOME,
    cols::TAX,
    cols::TAXS,
];

/// Everything `ivcig run` computes.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub year: u16,
    pub n_obs: usize,
    pub covariance: CovarianceKind,
    pub source: String,
    pub summary: Vec<ColumnSummary>,
    pub estimation: Estimation,
    pub endogeneity: EndogeneityReport,
}

/// Output of `ivcig describe`.
#[derive(Debug, Clone, Serialize)]
pub struct Description {
    pub year: u16,
    pub n_obs: usize,
    pub source: String,
    pub summary: Vec<ColumnSummary>,
}

/// Load and restrict to `config.year`, then derive.
pub fn prepare_frame(config: &AnalysisConfig) -> Result<Frame, AppError> {
    let panel = load_panel(&config.source)?;
    let frame = cross_section(&panel, config.year)?;
    info!(year = config.year, rows = frame.n_rows(), "cross-section selected");
    Ok(frame)
}

/// Rows of `year` with real and log variables appended.
///
/// Other years are never derived, so bad values there cannot fail the run.
pub fn cross_section(panel: &Frame, year: u16) -> Result<Frame, AppError> {
    let mut frame = panel.filter_eq(cols::YEAR, f64::from(year))?;
    if frame.n_rows() == 0 {
        let years: Vec<String> = panel
            .distinct(cols::YEAR)?
            .iter()
            .map(|y| format!("{y:.0}"))
            .collect();
        return Err(AppError::empty(format!(
            "No rows for year {year} (available: {}).",
            years.join(", ")
        )));
    }
    derive_real_variables(&mut frame)?;
    derive_log_columns(&mut frame)?;
    Ok(frame)
}

pub fn run_analysis(config: &AnalysisConfig) -> Result<Analysis, AppError> {
    let mut frame = prepare_frame(config)?;
    let summary = summarize(&frame, &SUMMARY_COLUMNS)?;
    let estimation = estimate(&mut frame, config.covariance)?;
    let endogeneity = test_endogeneity(&mut frame, config.covariance)?;

    Ok(Analysis {
        year: config.year,
        n_obs: frame.n_rows(),
        covariance: config.covariance,
        source: config.source.describe(),
        summary,
        estimation,
        endogeneity,
    })
}

pub fn describe(config: &AnalysisConfig) -> Result<Description, AppError> {
    let frame = prepare_frame(config)?;
    Ok(Description {
        year: config.year,
        n_obs: frame.n_rows(),
        source: config.source.describe(),
        summary: summarize(&frame, &SUMMARY_COLUMNS)?,
    })
}
