//! Terminal plotting.

pub mod ascii;
pub mod heatmap;

pub use ascii::*;
pub use heatmap::*;
