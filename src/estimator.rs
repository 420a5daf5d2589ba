//! Staged flood-frequency estimator.
//!
//! The estimator owns one `Sample` and moves through a fixed sequence of stages:
//!
//! ```text
//! Raw → StatisticsComputed → EmpiricalPositioned → MomentFitted → OptimallyFitted
//! ```
//!
//! Each stage carries exactly the results computed so far, so an operation can
//! only read what exists. Calling an operation before its stage is reached is a
//! `FreqError::Precondition`. Re-running an earlier step is allowed and drops
//! every later result.

use std::mem;

use crate::data::{Sample, compute_statistics, position};
use crate::domain::{
    DistParams, EmpiricalSeries, FittingConfig, PlottingPosition, SampleStatistics, SkewEstimator,
    Stage,
};
use crate::error::FreqError;
use crate::fit::{FitMode, FitOutcome, LmOptions, fit_curve};
use crate::models::{design_prob, design_value, sample_curve};

#[derive(Debug, Clone)]
enum State {
    Raw,
    Statistics(SampleStatistics),
    Positioned(SampleStatistics, EmpiricalSeries),
    MomentFitted(SampleStatistics, EmpiricalSeries, DistParams),
    Fitted(SampleStatistics, EmpiricalSeries, DistParams, FitOutcome),
}

impl State {
    fn stage(&self) -> Stage {
        match self {
            State::Raw => Stage::Raw,
            State::Statistics(..) => Stage::StatisticsComputed,
            State::Positioned(..) => Stage::EmpiricalPositioned,
            State::MomentFitted(..) => Stage::MomentFitted,
            State::Fitted(..) => Stage::OptimallyFitted,
        }
    }

    fn statistics(&self) -> Option<&SampleStatistics> {
        match self {
            State::Raw => None,
            State::Statistics(s)
            | State::Positioned(s, ..)
            | State::MomentFitted(s, ..)
            | State::Fitted(s, ..) => Some(s),
        }
    }

    fn empirical(&self) -> Option<&EmpiricalSeries> {
        match self {
            State::Positioned(_, e) | State::MomentFitted(_, e, ..) | State::Fitted(_, e, ..) => Some(e),
            _ => None,
        }
    }

    fn moment(&self) -> Option<&DistParams> {
        match self {
            State::MomentFitted(_, _, m) | State::Fitted(_, _, m, _) => Some(m),
            _ => None,
        }
    }

    fn fitted(&self) -> Option<&FitOutcome> {
        match self {
            State::Fitted(.., f) => Some(f),
            _ => None,
        }
    }
}

/// Pearson III frequency analysis of one sample.
#[derive(Debug, Clone)]
pub struct FrequencyEstimator {
    sample: Sample,
    skew: SkewEstimator,
    positions: PlottingPosition,
    state: State,
}

impl FrequencyEstimator {
    pub fn new(sample: Sample, skew: SkewEstimator) -> Self {
        Self {
            sample,
            skew,
            positions: PlottingPosition::Expectation,
            state: State::Raw,
        }
    }

    pub fn with_plotting_position(mut self, positions: PlottingPosition) -> Self {
        self.positions = positions;
        self.state = State::Raw;
        self
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// Compute EX, Cv and Cs. Always allowed; resets later stages.
    pub fn compute_statistics(&mut self) -> Result<&SampleStatistics, FreqError> {
        let stats = compute_statistics(&self.sample, self.skew)?;
        self.state = State::Statistics(stats);
        self.require_statistics("compute_statistics")
    }

    /// Rank the sample and assign plotting positions.
    pub fn position(&mut self) -> Result<&EmpiricalSeries, FreqError> {
        let stats = self.require_statistics("position")?.clone();
        let series = position(&self.sample, self.positions)?;
        self.state = State::Positioned(stats, series);
        self.require_empirical("position")
    }

    /// Adopt the moment estimate as the unoptimized parameter triple.
    pub fn moment_fit(&mut self) -> Result<DistParams, FreqError> {
        self.require_empirical("moment_fit")?;
        let state = mem::replace(&mut self.state, State::Raw);
        let (stats, series) = match state {
            State::Positioned(s, e) | State::MomentFitted(s, e, _) | State::Fitted(s, e, _, _) => (s, e),
            other => {
                self.state = other;
                return Err(self.precondition("moment_fit", Stage::EmpiricalPositioned));
            }
        };
        let moment = stats.moment_params();
        self.state = State::MomentFitted(stats, series, moment);
        Ok(moment)
    }

    /// Optimize the curve against the empirical series, seeded at the moment estimate.
    ///
    /// May be called again with a different configuration; each call refits from the
    /// moment estimate.
    pub fn optimize(&mut self, config: &FittingConfig, opts: &LmOptions) -> Result<&FitOutcome, FreqError> {
        let (stats, series, moment) = match &self.state {
            State::MomentFitted(s, e, m) | State::Fitted(s, e, m, _) => (s, e, *m),
            _ => return Err(self.precondition("optimize", Stage::MomentFitted)),
        };

        let mode = FitMode::resolve(config, stats.expectation)?;
        let outcome = fit_curve(series, &moment, mode, opts)?;

        let state = mem::replace(&mut self.state, State::Raw);
        self.state = match state {
            State::MomentFitted(s, e, m) | State::Fitted(s, e, m, _) => State::Fitted(s, e, m, outcome),
            other => other,
        };
        self.fitted().ok_or_else(|| self.precondition("optimize", Stage::MomentFitted))
    }

    /// Design value for an exceedance probability (percent) under the fitted curve.
    pub fn prob_to_value(&self, prob: f64) -> Result<f64, FreqError> {
        let fit = self.require_fitted("prob_to_value")?;
        design_value(prob, &fit.params)
    }

    /// Exceedance probability (percent) of a design value under the fitted curve.
    pub fn value_to_prob(&self, value: f64) -> Result<f64, FreqError> {
        let fit = self.require_fitted("value_to_prob")?;
        design_prob(value, &fit.params)
    }

    /// Unoptimized curve on an `n`-point grid over the display range.
    pub fn moment_curve(&self, n: usize) -> Result<Vec<(f64, f64)>, FreqError> {
        let series = self.require_empirical("moment_curve")?;
        let moment = self
            .state
            .moment()
            .ok_or_else(|| self.precondition("moment_curve", Stage::MomentFitted))?;
        sample_curve(moment, series.range, n)
    }

    /// Fitted curve on an `n`-point grid over the display range.
    pub fn fitted_curve(&self, n: usize) -> Result<Vec<(f64, f64)>, FreqError> {
        let fit = self.require_fitted("fitted_curve")?;
        let series = self.require_empirical("fitted_curve")?;
        sample_curve(&fit.params, series.range, n)
    }

    pub fn statistics(&self) -> Option<&SampleStatistics> {
        self.state.statistics()
    }

    pub fn empirical(&self) -> Option<&EmpiricalSeries> {
        self.state.empirical()
    }

    pub fn moment_params(&self) -> Option<&DistParams> {
        self.state.moment()
    }

    pub fn fitted(&self) -> Option<&FitOutcome> {
        self.state.fitted()
    }

    fn precondition(&self, operation: &'static str, required: Stage) -> FreqError {
        FreqError::Precondition {
            operation,
            required,
            actual: self.stage(),
        }
    }

    fn require_statistics(&self, operation: &'static str) -> Result<&SampleStatistics, FreqError> {
        self.state
            .statistics()
            .ok_or_else(|| self.precondition(operation, Stage::StatisticsComputed))
    }

    fn require_empirical(&self, operation: &'static str) -> Result<&EmpiricalSeries, FreqError> {
        self.state
            .empirical()
            .ok_or_else(|| self.precondition(operation, Stage::EmpiricalPositioned))
    }

    fn require_fitted(&self, operation: &'static str) -> Result<&FitOutcome, FreqError> {
        self.state
            .fitted()
            .ok_or_else(|| self.precondition(operation, Stage::OptimallyFitted))
    }
}
