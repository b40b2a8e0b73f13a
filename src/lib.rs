//! `ivcig` library crate.
//!
//! Instrumental-variable analysis of cigarette demand on the CigarettesSW
//! panel (48 US states, 1985 and 1995). The binary is a thin wrapper around
//! this library so the pipeline can be tested without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod endogeneity;
pub mod error;
pub mod estimate;
pub mod math;
pub mod report;
