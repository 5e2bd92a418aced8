//! Reporting utilities: formatted terminal output for sessions and grids.

pub mod format;

pub use format::*;
