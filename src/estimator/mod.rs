//! Bayesian adaptive estimation of the CSF.
//!
//! Responsibilities:
//!
//! - keep the posterior over the parameter grid (`posterior`)
//! - pick informative stimuli from posterior samples (`selection`)
//! - expose the `next` / `mark_response` / `results` loop (`qcsf`)

pub mod posterior;
pub mod qcsf;
pub mod selection;

pub use posterior::*;
pub use qcsf::*;
pub use selection::*;
