//! Grid construction.
//!
//! Responsibilities:
//!
//! - log-spaced stimulus axes (contrast via sensitivity, frequency)
//! - the flattened 4-D parameter grid and its index-to-model-unit maps

pub mod parameter;
pub mod stimulus;

pub use parameter::*;
pub use stimulus::*;
