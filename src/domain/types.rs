//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - passed between the estimation stages in-memory
//! - handed to a presentation layer as plain arrays and triples
//! - dumped as a JSON report

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the coefficient of skew is estimated from the sample.
///
/// Both estimators are kept because neither is authoritative when comparing
/// against external references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SkewEstimator {
    /// `Σ(K_i - 1)³ / ((n - 3) · Cv³)` on the modulus ratios `K_i = x_i / EX`.
    Moment,
    /// Bias-corrected sample skewness `G1 = g1 · sqrt(n(n-1)) / (n-2)` of the raw values.
    Standard,
}

impl SkewEstimator {
    /// Smallest sample for which the estimator is defined.
    pub fn min_sample(self) -> usize {
        match self {
            SkewEstimator::Moment => 4,
            SkewEstimator::Standard => 3,
        }
    }
}

impl fmt::Display for SkewEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkewEstimator::Moment => write!(f, "moment"),
            SkewEstimator::Standard => write!(f, "standard"),
        }
    }
}

/// Empirical exceedance-probability formula for the rank-`m` observation of `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlottingPosition {
    /// Mathematical-expectation (Weibull) formula `m / (n + 1)`.
    Expectation,
    /// Chegodayev formula `(m - 0.3) / (n + 0.4)`.
    Chegodayev,
    /// Hazen formula `(m - 0.5) / n`.
    Hazen,
}

impl PlottingPosition {
    /// Exceedance probability in percent for 1-based `rank`.
    pub fn probability(self, rank: usize, n: usize) -> f64 {
        let m = rank as f64;
        let n = n as f64;
        let p = match self {
            PlottingPosition::Expectation => m / (n + 1.0),
            PlottingPosition::Chegodayev => (m - 0.3) / (n + 0.4),
            PlottingPosition::Hazen => (m - 0.5) / n,
        };
        p * 100.0
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PlottingPosition::Expectation => "expectation m/(n+1)",
            PlottingPosition::Chegodayev => "Chegodayev (m-0.3)/(n+0.4)",
            PlottingPosition::Hazen => "Hazen (m-0.5)/n",
        }
    }
}

/// Lifecycle stage of a `FrequencyEstimator`.
///
/// Stages are strictly ordered; an operation that needs a later stage than the
/// current one fails with a precondition error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Raw,
    StatisticsComputed,
    EmpiricalPositioned,
    MomentFitted,
    OptimallyFitted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Raw => "raw",
            Stage::StatisticsComputed => "statistics-computed",
            Stage::EmpiricalPositioned => "empirical-positioned",
            Stage::MomentFitted => "moment-fitted",
            Stage::OptimallyFitted => "optimally-fitted",
        };
        f.write_str(name)
    }
}

/// Which parameters float during optimization.
///
/// - `sv_ratio == 0`: `Cs` is a free parameter.
/// - `sv_ratio != 0`: `Cs = sv_ratio · Cv` and `Cs` leaves the optimization.
/// - `fit_ex == false`: `EX` is held at the sample mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittingConfig {
    pub sv_ratio: f64,
    pub fit_ex: bool,
}

impl Default for FittingConfig {
    fn default() -> Self {
        Self {
            sv_ratio: 0.0,
            fit_ex: true,
        }
    }
}

/// Pearson III parameters in modulus-ratio space: mean, coefficient of
/// variation, coefficient of skew.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistParams {
    pub ex: f64,
    pub cv: f64,
    pub cs: f64,
}

impl DistParams {
    pub fn new(ex: f64, cv: f64, cs: f64) -> Self {
        Self { ex, cv, cs }
    }

    /// `Cs / Cv`.
    pub fn skew_ratio(&self) -> f64 {
        self.cs / self.cv
    }

    pub fn is_finite(&self) -> bool {
        self.ex.is_finite() && self.cv.is_finite() && self.cs.is_finite()
    }
}

/// Statistics derived once from a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleStatistics {
    pub n: usize,
    pub estimator: SkewEstimator,
    /// Arithmetic mean `EX`.
    pub expectation: f64,
    /// `K_i = x_i / EX`, in sample order.
    pub modulus_ratios: Vec<f64>,
    pub coeff_of_var: f64,
    pub coeff_of_skew: f64,
}

impl SampleStatistics {
    /// The moment estimate of the distribution parameters.
    pub fn moment_params(&self) -> DistParams {
        DistParams::new(self.expectation, self.coeff_of_var, self.coeff_of_skew)
    }
}

/// Probability-axis display range `[left, right]` in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbRange {
    pub left: f64,
    pub right: f64,
}

/// The sample sorted descending with one exceedance probability per rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmpiricalSeries {
    pub method: PlottingPosition,
    /// Values sorted descending (rank 1 first).
    pub values: Vec<f64>,
    /// Exceedance probabilities (percent), strictly increasing with rank.
    pub probs: Vec<f64>,
    /// Sample index of each ranked value.
    pub order: Vec<usize>,
    pub range: ProbRange,
}

impl EmpiricalSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Goodness-of-fit diagnostics for the optimized curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    pub iterations: usize,
}

/// A free parameter's estimate with its standard error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamError {
    pub name: &'static str,
    pub value: f64,
    pub std_error: f64,
}

/// Where the sample comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleSource {
    /// CSV file with a flow column (and optionally `year` or `date`).
    Csv {
        path: PathBuf,
        column: Option<String>,
    },
    /// Values passed on the command line.
    Values(Vec<f64>),
    /// Pearson III draws with a fixed seed.
    Synthetic {
        n: usize,
        params: DistParams,
        seed: u64,
    },
    /// The bundled 24-year annual-peak record.
    WorkedExample,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub source: SampleSource,
    pub skew: SkewEstimator,
    pub positions: PlottingPosition,
    pub fitting: FittingConfig,
    pub max_iterations: usize,
    /// Design frequencies (percent) to convert to design values.
    pub design_probs: Vec<f64>,
    /// Design values to convert to design frequencies.
    pub design_values: Vec<f64>,
    /// Evaluation grid size for the theoretical curves.
    pub curve_points: usize,
}
