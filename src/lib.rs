//! `flood-frequency` library crate.
//!
//! The binary (`ffa`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimator can be embedded by other front-ends
//! - code stays easy to navigate as the project grows
//!
//! The core is [`estimator::FrequencyEstimator`]: sample statistics, plotting
//! positions, moment estimate, Levenberg–Marquardt fit, then design value ↔
//! design frequency conversion under the fitted Pearson III curve.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
