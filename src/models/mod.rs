//! Psychometric model: the truncated log-parabola CSF and `P(correct)`.
//!
//! Models are implemented as small, pure functions so the posterior and the
//! stimulus selector can stay generic over the grid.

pub mod csf;

pub use csf::*;
