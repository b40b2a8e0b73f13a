//! CSV loading.
//!
//! The cigarette panel (48 continental states, 1985 and 1995) ships inside
//! the binary. A file with the same schema can replace it.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::data::cols;
use crate::data::frame::Frame;
use crate::domain::DataSource;
use crate::error::AppError;

const BUNDLED_CSV: &str = include_str!("../../data/cigarettes_sw.csv");

/// Load the panel from the configured source.
pub fn load_panel(source: &DataSource) -> Result<Frame, AppError> {
    let frame = match source {
        DataSource::Bundled => load_bundled()?,
        DataSource::Path(path) => load_csv_path(path)?,
    };
    info!(
        source = %source.describe(),
        rows = frame.n_rows(),
        "loaded panel"
    );
    Ok(frame)
}

pub fn load_bundled() -> Result<Frame, AppError> {
    parse_csv(BUNDLED_CSV.as_bytes())
}

pub fn load_csv_path(path: &Path) -> Result<Frame, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    parse_csv(file)
}

/// Parse a panel CSV: a `state` identifier plus numeric columns.
///
/// Every non-identifier column must parse as `f64` on every row; the first
/// offending cell aborts the load.
pub fn parse_csv<R: Read>(reader: R) -> Result<Frame, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let id_idx = headers
        .iter()
        .position(|h| h == cols::STATE)
        .ok_or_else(|| AppError::input(format!("Missing column '{}'.", cols::STATE)))?;
    for required in cols::REQUIRED {
        if !headers.iter().any(|h| h == required) {
            return Err(AppError::input(format!("Missing column '{required}'.")));
        }
    }

    let numeric: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != id_idx)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut ids = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); numeric.len()];
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(ids.len() as u64 + 2);
        ids.push(record.get(id_idx).unwrap_or_default().to_string());
        for (slot, (idx, name)) in numeric.iter().enumerate() {
            let raw = record.get(*idx).unwrap_or_default();
            let v = parse_cell(raw).ok_or_else(|| {
                AppError::input(format!(
                    "Column '{name}' is not numeric at line {line}: '{raw}'."
                ))
            })?;
            values[slot].push(v);
        }
    }

    if ids.is_empty() {
        return Err(AppError::empty("Dataset has no rows."));
    }
    debug!(rows = ids.len(), columns = numeric.len(), "parsed CSV");

    let mut frame = Frame::new(cols::STATE, ids);
    for ((_, name), col) in numeric.into_iter().zip(values) {
        frame.add_column(name, col)?;
    }
    Ok(frame)
}

fn parse_cell(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_panel_has_both_years() {
        let frame = load_bundled().unwrap();
        assert_eq!(frame.n_rows(), 96);
        for year in [1985.0, 1995.0] {
            assert_eq!(frame.filter_eq(cols::YEAR, year).unwrap().n_rows(), 48);
        }
        for name in cols::REQUIRED {
            assert!(frame.has_column(name), "missing {name}");
        }
    }

    #[test]
    fn rejects_non_numeric_cell() {
        let csv = "state,year,cpi,population,packs,income,tax,price,taxs\n\
                   AL,1995,1.5,100,90,1000,40,150,abc\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("taxs"), "{err}");
    }

    #[test]
    fn rejects_missing_column() {
        let csv = "state,year,cpi,population,packs,income,tax,price\n\
                   AL,1995,1.5,100,90,1000,40,150\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(err.message().contains("taxs"), "{err}");
    }

    #[test]
    fn rejects_empty_file() {
        let csv = "state,year,cpi,population,packs,income,tax,price,taxs\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_EMPTY);
    }

    #[test]
    fn missing_path_is_input_error() {
        let err = load_csv_path(Path::new("/nonexistent/cig.csv")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
