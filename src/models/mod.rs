//! Pearson III curve evaluation.
//!
//! Evaluation is a set of small, pure functions so that fitting and reporting
//! code can share them.

pub mod curve;

pub use curve::*;
