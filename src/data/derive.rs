//! Derived variables.
//!
//! - `rprice   = price / cpi`
//! - `salestax = (taxs - tax) / cpi`  (general sales tax component, real terms)
//!
//! plus the log transforms the regressions are written in.

use tracing::debug;

use crate::data::cols;
use crate::data::frame::Frame;
use crate::error::AppError;

/// Append `rprice` and `salestax`.
pub fn derive_real_variables(frame: &mut Frame) -> Result<(), AppError> {
    let cpi = frame.column(cols::CPI)?;
    if let Some(i) = cpi.iter().position(|&c| !(c.is_finite() && c > 0.0)) {
        return Err(AppError::input(format!(
            "cpi must be positive (row {}, {}).",
            i + 1,
            frame.ids()[i]
        )));
    }

    let price = frame.column(cols::PRICE)?;
    let tax = frame.column(cols::TAX)?;
    let taxs = frame.column(cols::TAXS)?;

    let rprice: Vec<f64> = price.iter().zip(cpi).map(|(p, c)| p / c).collect();
    let salestax: Vec<f64> = taxs
        .iter()
        .zip(tax)
        .zip(cpi)
        .map(|((ts, t), c)| (ts - t) / c)
        .collect();

    frame.add_column(cols::RPRICE, rprice)?;
    frame.add_column(cols::SALESTAX, salestax)?;
    debug!(rows = frame.n_rows(), "derived rprice and salestax");
    Ok(())
}

/// Append `lpacks`, `lrprice`, `lpop`, `lrincome`.
///
/// Requires `derive_real_variables` to have run.
pub fn derive_log_columns(frame: &mut Frame) -> Result<(), AppError> {
    let lpacks = ln_column(frame, frame.column(cols::PACKS)?, cols::PACKS)?;
    let lrprice = ln_column(frame, frame.column(cols::RPRICE)?, cols::RPRICE)?;
    let lpop = ln_column(frame, frame.column(cols::POPULATION)?, cols::POPULATION)?;

    let real_income: Vec<f64> = frame
        .column(cols::INCOME)?
        .iter()
        .zip(frame.column(cols::CPI)?)
        .map(|(inc, c)| inc / c)
        .collect();
    let lrincome = ln_column(frame, &real_income, "income / cpi")?;

    frame.add_column(cols::LPACKS, lpacks)?;
    frame.add_column(cols::LRPRICE, lrprice)?;
    frame.add_column(cols::LPOP, lpop)?;
    frame.add_column(cols::LRINCOME, lrincome)?;
    Ok(())
}

fn ln_column(frame: &Frame, values: &[f64], label: &str) -> Result<Vec<f64>, AppError> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if v > 0.0 && v.is_finite() {
                Ok(v.ln())
            } else {
                Err(AppError::input(format!(
                    "Cannot take log of {label} = {v} (row {}, {}).",
                    i + 1,
                    frame.ids()[i]
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Frame {
        let mut f = Frame::new(cols::STATE, vec!["AA".into(), "BB".into()]);
        for (name, vals) in [
            (cols::YEAR, [1995.0, 1995.0]),
            (cols::CPI, [2.0, 1.0]),
            (cols::POPULATION, [100.0, 200.0]),
            (cols::PACKS, [80.0, 100.0]),
            (cols::INCOME, [1000.0, 3000.0]),
            (cols::TAX, [40.0, 30.0]),
            (cols::PRICE, [200.0, 150.0]),
            (cols::TAXS, [50.0, 30.0]),
        ] {
            f.add_column(name, vals.to_vec()).unwrap();
        }
        f
    }

    #[test]
    fn real_price_and_sales_tax() {
        let mut f = tiny();
        derive_real_variables(&mut f).unwrap();
        assert_eq!(f.column(cols::RPRICE).unwrap(), &[100.0, 150.0]);
        assert_eq!(f.column(cols::SALESTAX).unwrap(), &[5.0, 0.0]);
    }

    #[test]
    fn logs_follow_real_variables() {
        let mut f = tiny();
        derive_real_variables(&mut f).unwrap();
        derive_log_columns(&mut f).unwrap();
        let lrprice = f.column(cols::LRPRICE).unwrap();
        assert!((lrprice[0] - 100.0_f64.ln()).abs() < 1e-12);
        let lrincome = f.column(cols::LRINCOME).unwrap();
        assert!((lrincome[0] - 500.0_f64.ln()).abs() < 1e-12);
        assert_eq!(f.n_rows(), 2);
    }

    #[test]
    fn missing_source_column_fails() {
        let mut f = Frame::new(cols::STATE, vec!["AA".into()]);
        f.add_column(cols::CPI, vec![1.0]).unwrap();
        f.add_column(cols::PRICE, vec![1.0]).unwrap();
        let err = derive_real_variables(&mut f).unwrap_err();
        assert!(err.message().contains(cols::TAX));
    }

    #[test]
    fn non_positive_cpi_fails() {
        let mut f = tiny();
        let mut bad = Frame::new(cols::STATE, f.ids().to_vec());
        for name in cols::REQUIRED {
            let mut vals = f.column(name).unwrap().to_vec();
            if name == cols::CPI {
                vals[1] = 0.0;
            }
            bad.add_column(name, vals).unwrap();
        }
        assert!(derive_real_variables(&mut bad).is_err());
        assert!(derive_real_variables(&mut f).is_ok());
    }

    #[test]
    fn log_of_zero_packs_fails() {
        let f = tiny();
        let mut bad = Frame::new(cols::STATE, f.ids().to_vec());
        for name in cols::REQUIRED {
            let mut vals = f.column(name).unwrap().to_vec();
            if name == cols::PACKS {
                vals[0] = 0.0;
            }
            bad.add_column(name, vals).unwrap();
        }
        derive_real_variables(&mut bad).unwrap();
        let err = derive_log_columns(&mut bad).unwrap_err();
        assert!(err.message().contains("packs"), "{err}");
    }
}
