//! Design matrices built from frame columns.

use nalgebra::DMatrix;

use crate::data::Frame;
use crate::error::AppError;

/// Name of the intercept term in coefficient tables.
pub const INTERCEPT: &str = "const";

/// Named regressor columns, assembled into an `n × k` matrix on demand.
#[derive(Debug, Clone)]
pub struct Design {
    n: usize,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Design {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Design holding only an intercept.
    pub fn intercept(n: usize) -> Self {
        let mut d = Self::new(n);
        d.names.push(INTERCEPT.to_string());
        d.columns.push(vec![1.0; n]);
        d
    }

    /// Intercept plus the named frame columns, in order.
    pub fn from_frame(frame: &Frame, regressors: &[&str]) -> Result<Self, AppError> {
        let mut d = Self::intercept(frame.n_rows());
        for name in regressors {
            d.push(*name, frame.column(name)?.to_vec())?;
        }
        Ok(d)
    }

    pub fn push(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), AppError> {
        let name = name.into();
        if values.len() != self.n {
            return Err(AppError::input(format!(
                "Regressor '{name}' has {} rows, expected {}.",
                values.len(),
                self.n
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::numeric(format!("Regressor '{name}' has non-finite values.")));
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.n, self.columns.len(), |i, j| self.columns[j][i])
    }
}
