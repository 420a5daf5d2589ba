//! Curve fitting.
//!
//! Responsibilities:
//!
//! - resolve the fitting mode (which parameters float)
//! - run Levenberg–Marquardt from the moment estimate
//! - report fit diagnostics and parameter standard errors

pub mod fitter;
pub mod mode;

pub use fitter::*;
pub use mode::FitMode;
