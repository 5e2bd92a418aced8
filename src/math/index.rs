//! Mixed-radix index codec.
//!
//! Both grids (2-D stimulus, 4-D parameter) are stored flat. A flat index is the
//! mixed-radix number whose digit `i` has base `dims[i]`, with dimension 0 the
//! fastest-varying digit:
//!
//! ```text
//! flat = d0 + dims[0] * (d1 + dims[1] * (d2 + ...))
//! ```
//!
//! `flatten` and `inflate` are exact inverses on `[0, prod(dims))`. Every caller
//! goes through this module so there is a single axis-order convention.

use nalgebra::DMatrix;

/// A fixed set of dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedRadix {
    dims: Vec<usize>,
    count: usize,
}

impl MixedRadix {
    /// Saturates instead of overflowing; configurations are size-checked before this.
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
            count: dims.iter().fold(1usize, |acc, &n| acc.saturating_mul(n)),
        }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of combinations (`prod(dims)`).
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn flatten(&self, digits: &[usize]) -> usize {
        flatten(digits, &self.dims)
    }

    pub fn inflate(&self, flat: usize) -> Vec<usize> {
        inflate(flat, &self.dims)
    }

    pub fn inflate_many(&self, flats: &[usize]) -> DMatrix<usize> {
        inflate_many(flats, &self.dims)
    }
}

/// Encode per-dimension digits into a flat index.
///
/// `digits` and `dims` must have the same length and every digit must be below
/// its dimension size.
pub fn flatten(digits: &[usize], dims: &[usize]) -> usize {
    debug_assert_eq!(digits.len(), dims.len());
    let mut flat = 0usize;
    for (&digit, &size) in digits.iter().zip(dims.iter()).rev() {
        debug_assert!(digit < size.max(1));
        flat = flat * size + digit;
    }
    flat
}

/// Decode a flat index into per-dimension digits.
///
/// The last digit receives whatever remains after peeling off the others, so an
/// out-of-range flat index shows up as an out-of-range last digit.
pub fn inflate(flat: usize, dims: &[usize]) -> Vec<usize> {
    let mut out = vec![0usize; dims.len()];
    inflate_into(flat, dims, &mut out);
    out
}

/// Allocation-free variant of [`inflate`].
pub fn inflate_into(flat: usize, dims: &[usize], out: &mut [usize]) {
    let Some(last) = dims.len().checked_sub(1) else {
        return;
    };
    let mut rest = flat;
    for i in 0..last {
        out[i] = rest % dims[i];
        rest /= dims[i];
    }
    out[last] = rest;
}

/// Decode a column of flat indices into an `N × D` matrix (row `r` = digits of `flats[r]`).
pub fn inflate_many(flats: &[usize], dims: &[usize]) -> DMatrix<usize> {
    let decoded: Vec<Vec<usize>> = flats.iter().map(|&f| inflate(f, dims)).collect();
    DMatrix::from_fn(flats.len(), dims.len(), |r, c| decoded[r][c])
}
