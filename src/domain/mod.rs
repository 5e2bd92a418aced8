//! Domain types used throughout the estimator.
//!
//! This module defines:
//!
//! - boundary types exchanged with the trial controller (`Stimulus`, `TrialRecord`)
//! - CSF parameter representations (`CsfParameters`, `CsfEstimate`)
//! - configuration (`EstimatorConfig`, `SimulationConfig`)

pub mod types;

pub use types::*;
