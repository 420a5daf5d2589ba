//! Fitting modes: which Pearson III parameters float during optimization.
//!
//! | `sv_ratio` | `fit_ex` | free parameters | fixed relation              |
//! |------------|----------|-----------------|-----------------------------|
//! | 0          | true     | EX, Cv, Cs      | none                        |
//! | 0          | false    | Cv, Cs          | EX = sample mean            |
//! | ≠ 0        | true     | EX, Cv          | Cs = sv_ratio · Cv          |
//! | ≠ 0        | false    | Cv              | EX = sample mean, Cs = sv_ratio · Cv |
//!
//! The mode is resolved once from the configuration; each variant has its own
//! `Parameterization` that maps the free vector θ back to a full triple.

use serde::Serialize;

use crate::domain::{DistParams, FittingConfig};
use crate::error::FreqError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FitMode {
    Full,
    FixedMean { ex: f64 },
    FixedRatio { ratio: f64 },
    FixedMeanRatio { ex: f64, ratio: f64 },
}

impl FitMode {
    pub fn resolve(config: &FittingConfig, sample_mean: f64) -> Result<Self, FreqError> {
        let ratio = config.sv_ratio;
        if !ratio.is_finite() {
            return Err(FreqError::domain("sv_ratio", ratio, "Cs/Cv ratio must be finite"));
        }

        Ok(match (ratio == 0.0, config.fit_ex) {
            (true, true) => FitMode::Full,
            (true, false) => FitMode::FixedMean { ex: sample_mean },
            (false, true) => FitMode::FixedRatio { ratio },
            (false, false) => FitMode::FixedMeanRatio {
                ex: sample_mean,
                ratio,
            },
        })
    }

    /// Short label naming the free parameters.
    pub fn name(&self) -> &'static str {
        match self {
            FitMode::Full => "ex-cv-cs",
            FitMode::FixedMean { .. } => "cv-cs",
            FitMode::FixedRatio { .. } => "ex-cv",
            FitMode::FixedMeanRatio { .. } => "cv",
        }
    }

    pub fn free_names(&self) -> &'static [&'static str] {
        match self {
            FitMode::Full => &["EX", "Cv", "Cs"],
            FitMode::FixedMean { .. } => &["Cv", "Cs"],
            FitMode::FixedRatio { .. } => &["EX", "Cv"],
            FitMode::FixedMeanRatio { .. } => &["Cv"],
        }
    }

    pub fn free_len(&self) -> usize {
        self.free_names().len()
    }
}

/// Mapping between the optimizer's free vector and a full parameter triple.
pub(crate) trait Parameterization {
    /// Initial θ from the moment estimate.
    fn seed(&self, moment: &DistParams) -> Vec<f64>;
    /// Full triple for θ, filling fixed parameters from their relation.
    fn expand(&self, theta: &[f64]) -> DistParams;
}

pub(crate) struct Full;

pub(crate) struct FixedMean {
    pub ex: f64,
}

pub(crate) struct FixedRatio {
    pub ratio: f64,
}

pub(crate) struct FixedMeanRatio {
    pub ex: f64,
    pub ratio: f64,
}

impl Parameterization for Full {
    fn seed(&self, moment: &DistParams) -> Vec<f64> {
        vec![moment.ex, moment.cv, moment.cs]
    }

    fn expand(&self, theta: &[f64]) -> DistParams {
        DistParams::new(theta[0], theta[1], theta[2])
    }
}

impl Parameterization for FixedMean {
    fn seed(&self, moment: &DistParams) -> Vec<f64> {
        vec![moment.cv, moment.cs]
    }

    fn expand(&self, theta: &[f64]) -> DistParams {
        DistParams::new(self.ex, theta[0], theta[1])
    }
}

impl Parameterization for FixedRatio {
    fn seed(&self, moment: &DistParams) -> Vec<f64> {
        vec![moment.ex, moment.cv]
    }

    fn expand(&self, theta: &[f64]) -> DistParams {
        DistParams::new(theta[0], theta[1], theta[1] * self.ratio)
    }
}

impl Parameterization for FixedMeanRatio {
    fn seed(&self, moment: &DistParams) -> Vec<f64> {
        vec![moment.cv]
    }

    fn expand(&self, theta: &[f64]) -> DistParams {
        DistParams::new(self.ex, theta[0], theta[0] * self.ratio)
    }
}
