//! Command-line parsing for `ivcig`.
//!
//! Argument parsing stays separate from the estimation code; the app layer
//! turns these structs into an [`AnalysisConfig`](crate::domain::AnalysisConfig).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{CovarianceKind, OutputFormat};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ivcig",
    version,
    about = "Instrumental-variable analysis of cigarette demand (CigarettesSW)"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full analysis: OLS, manual 2SLS, IV, IV with controls, endogeneity tests.
    Run(RunArgs),
    /// Print summary statistics for one cross-section.
    Describe(DataArgs),
}

/// Where the data comes from and which year to use.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Cross-section year to analyse.
    #[arg(short, long, default_value_t = 1995)]
    pub year: u16,

    /// CSV with the CigarettesSW schema; the bundled copy is used when absent.
    #[arg(long, env = "IVCIG_DATA", value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Coefficient covariance estimator for every table.
    #[arg(long = "cov", value_enum, default_value_t = CovarianceKind::Hc1)]
    pub covariance: CovarianceKind,
}
