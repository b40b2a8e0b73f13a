//! Shared domain types.
//!
//! These types are kept small and serializable so the same values can be
//! rendered as text tables or dumped as JSON.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Coefficient covariance estimator used for standard errors.
///
/// All tables in a run use the same estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CovarianceKind {
    /// Homoskedastic `σ² (X'X)⁻¹`.
    Classical,
    /// White sandwich, no small-sample scaling.
    Hc0,
    /// HC0 scaled by `n / (n - k)`.
    #[default]
    Hc1,
    /// Squared residuals divided by `1 - h_ii`.
    Hc2,
    /// Squared residuals divided by `(1 - h_ii)²`.
    Hc3,
}

impl CovarianceKind {
    pub fn display_name(self) -> &'static str {
        match self {
            CovarianceKind::Classical => "classical",
            CovarianceKind::Hc0 => "HC0",
            CovarianceKind::Hc1 => "HC1",
            CovarianceKind::Hc2 => "HC2",
            CovarianceKind::Hc3 => "HC3",
        }
    }

    pub fn is_robust(self) -> bool {
        !matches!(self, CovarianceKind::Classical)
    }
}

impl fmt::Display for CovarianceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How the analysis is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where the panel comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The CSV compiled into the binary.
    Bundled,
    /// A CSV on disk with the same schema.
    Path(PathBuf),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Bundled => "bundled CigarettesSW".to_string(),
            DataSource::Path(p) => p.display().to_string(),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// Built from CLI flags (plus `.env` / defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub source: DataSource,
    /// Cross-section used for estimation.
    pub year: u16,
    pub covariance: CovarianceKind,
    pub format: OutputFormat,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Bundled,
            year: 1995,
            covariance: CovarianceKind::Hc1,
            format: OutputFormat::Text,
        }
    }
}

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

impl Coefficient {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value.is_finite() && self.p_value < alpha
    }
}

/// Descriptive statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covariance_is_hc1() {
        assert_eq!(CovarianceKind::default(), CovarianceKind::Hc1);
        assert_eq!(AnalysisConfig::default().covariance, CovarianceKind::Hc1);
        assert!(CovarianceKind::Hc1.is_robust());
        assert!(!CovarianceKind::Classical.is_robust());
    }

    #[test]
    fn significance_requires_finite_p() {
        let mut c = Coefficient {
            term: "x".to_string(),
            estimate: 1.0,
            std_error: 0.1,
            t_value: 10.0,
            p_value: 0.001,
        };
        assert!(c.is_significant(0.05));
        c.p_value = f64::NAN;
        assert!(!c.is_significant(0.05));
    }
}
