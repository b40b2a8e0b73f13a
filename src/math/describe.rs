//! Descriptive statistics.

use crate::data::Frame;
use crate::domain::ColumnSummary;
use crate::error::AppError;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Pearson correlation. Errors on length mismatch or a constant input.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Result<f64, AppError> {
    if a.len() != b.len() {
        return Err(AppError::numeric(format!(
            "Correlation inputs differ in length ({} vs {}).",
            a.len(),
            b.len()
        )));
    }
    let (ma, mb) = match (mean(a), mean(b)) {
        (Some(ma), Some(mb)) => (ma, mb),
        _ => return Err(AppError::empty("Correlation of empty columns.")),
    };

    let mut sab = 0.0;
    let mut saa = 0.0;
    let mut sbb = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - ma;
        let dy = y - mb;
        sab += dx * dy;
        saa += dx * dx;
        sbb += dy * dy;
    }
    if saa <= 0.0 || sbb <= 0.0 {
        return Err(AppError::numeric("Correlation undefined for a constant column."));
    }
    Ok(sab / (saa * sbb).sqrt())
}

/// Count / mean / sd / min / max for each named column.
pub fn summarize(frame: &Frame, columns: &[&str]) -> Result<Vec<ColumnSummary>, AppError> {
    columns
        .iter()
        .map(|name| {
            let values = frame.column(name)?;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Ok(ColumnSummary {
                name: name.to_string(),
                count: values.len(),
                mean: mean(values).unwrap_or(f64::NAN),
                std_dev: std_dev(values).unwrap_or(f64::NAN),
                min,
                max,
            })
        })
        .collect()
}
