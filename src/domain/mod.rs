//! Domain types used throughout the pipeline.
//!
//! - run configuration (`AnalysisConfig`, `CovarianceKind`, `OutputFormat`)
//! - result rows (`Coefficient`, `ColumnSummary`)

pub mod types;

pub use types::*;
