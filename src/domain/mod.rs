//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - estimator options (`SkewEstimator`, `PlottingPosition`, `FittingConfig`)
//! - stage outputs (`SampleStatistics`, `EmpiricalSeries`, `DistParams`)
//! - the run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
