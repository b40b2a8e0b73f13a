//! Numerical building blocks: design matrices, least squares, covariance
//! estimators, descriptive statistics.

pub mod covariance;
pub mod describe;
pub mod design;
pub mod ols;

pub use covariance::*;
pub use describe::*;
pub use design::*;
pub use ols::*;
