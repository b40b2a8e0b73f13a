//! In-memory column table.
//!
//! The panel is loaded once and then enriched by appending derived columns
//! (real price, instrument, logs, fitted values, residuals). Row subsets are
//! new frames; columns are never removed or rewritten.

use crate::error::AppError;

/// Tolerance used when matching a numeric key column (e.g. `year`).
const KEY_EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// A flat table: one string identifier column plus named numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    id_name: String,
    ids: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new(id_name: impl Into<String>, ids: Vec<String>) -> Self {
        Self {
            id_name: id_name.into(),
            ids,
            columns: Vec::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Borrow a numeric column by name.
    pub fn column(&self, name: &str) -> Result<&[f64], AppError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| {
                let available: Vec<&str> = self.column_names().collect();
                AppError::input(format!(
                    "Missing column '{name}' (have: {}).",
                    available.join(", ")
                ))
            })
    }

    /// Append a column. Names are unique and lengths must match the row count.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), AppError> {
        let name = name.into();
        if name == self.id_name || self.has_column(&name) {
            return Err(AppError::input(format!("Column '{name}' already exists.")));
        }
        if values.len() != self.n_rows() {
            return Err(AppError::input(format!(
                "Column '{name}' has {} values, expected {}.",
                values.len(),
                self.n_rows()
            )));
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    /// Rows where `column == value`.
    pub fn filter_eq(&self, column: &str, value: f64) -> Result<Frame, AppError> {
        let key = self.column(column)?;
        let keep: Vec<usize> = key
            .iter()
            .enumerate()
            .filter(|(_, v)| (**v - value).abs() < KEY_EPS)
            .map(|(i, _)| i)
            .collect();

        Ok(Frame {
            id_name: self.id_name.clone(),
            ids: keep.iter().map(|&i| self.ids[i].clone()).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: keep.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
        })
    }

    /// Distinct values of a numeric column, in first-seen order.
    pub fn distinct(&self, column: &str) -> Result<Vec<f64>, AppError> {
        let mut out: Vec<f64> = Vec::new();
        for &v in self.column(column)? {
            if !out.iter().any(|o| (o - v).abs() < KEY_EPS) {
                out.push(v);
            }
        }
        Ok(out)
    }
}
