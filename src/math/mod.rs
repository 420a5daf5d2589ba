//! Mathematical utilities: the Pearson III primitive, least squares, grids.

pub mod grid;
pub mod ols;
pub mod pearson3;

pub use grid::*;
pub use ols::*;
pub use pearson3::*;
