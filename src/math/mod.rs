//! Mathematical utilities: mixed-radix indexing and entropy.

pub mod index;
pub mod info;

pub use index::*;
pub use info::*;
