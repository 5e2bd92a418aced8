//! `quick-csf` library crate.
//!
//! Bayesian adaptive estimation of contrast sensitivity functions (QuickCSF).
//! The binary (`qcsf`) is a thin wrapper around this library so that:
//!
//! - the estimator is testable without spawning processes
//! - the estimator can be embedded in other experiment software

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod grid;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod simulate;
