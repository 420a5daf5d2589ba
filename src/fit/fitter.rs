//! Nonlinear least-squares fitting of the Pearson III curve.
//!
//! Given:
//! - empirical exceedance probabilities `p_i` and ranked flows `y_i`
//! - a fitting mode (which of EX / Cv / Cs float)
//! - the moment estimate as the starting point
//!
//! we minimize `Σ (x(p_i; θ) - y_i)²` over the free parameters θ with
//! Levenberg–Marquardt:
//!
//! - forward-difference Jacobian
//! - damping scaled by `diag(JᵀJ)` (Marquardt scaling)
//! - each damped step solved as a stacked least-squares problem via SVD
//! - stop when both actual and predicted relative SSE reduction fall below
//!   `ftol`, or the step falls below `xtol` relative to θ
//!
//! A failure to converge is reported, never papered over with the seed.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::debug;

use crate::domain::{DistParams, EmpiricalSeries, FitQuality, ParamError};
use crate::error::FreqError;
use crate::fit::mode::{FitMode, FixedMean, FixedMeanRatio, FixedRatio, Full, Parameterization};
use crate::math::{solve_least_squares, stack_rows};
use crate::models::design_values;

/// Relative finite-difference step for the Jacobian (`sqrt(f64::EPSILON)`).
const FD_STEP: f64 = 1.490_116_119_384_765_6e-8;
const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e20;

/// Levenberg–Marquardt stopping rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmOptions {
    pub max_iterations: usize,
    pub ftol: f64,
    pub xtol: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
        }
    }
}

/// Result of an optimized fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitOutcome {
    pub mode: FitMode,
    /// Complete triple; fixed parameters are filled from their relation.
    pub params: DistParams,
    pub quality: FitQuality,
    /// Standard errors of the free parameters (empty when `JᵀJ` is not invertible
    /// or there are no residual degrees of freedom).
    pub std_errors: Vec<ParamError>,
}

/// Fit the Pearson III curve to the empirical series under `mode`.
pub fn fit_curve(
    series: &EmpiricalSeries,
    moment: &DistParams,
    mode: FitMode,
    opts: &LmOptions,
) -> Result<FitOutcome, FreqError> {
    if series.len() < mode.free_len() {
        return Err(FreqError::convergence(
            mode.name(),
            format!(
                "{} empirical points cannot determine {} free parameters",
                series.len(),
                mode.free_len()
            ),
        ));
    }

    match mode {
        FitMode::Full => run(&Full, mode, series, moment, opts),
        FitMode::FixedMean { ex } => run(&FixedMean { ex }, mode, series, moment, opts),
        FitMode::FixedRatio { ratio } => run(&FixedRatio { ratio }, mode, series, moment, opts),
        FitMode::FixedMeanRatio { ex, ratio } => {
            run(&FixedMeanRatio { ex, ratio }, mode, series, moment, opts)
        }
    }
}

fn run<P: Parameterization>(
    param: &P,
    mode: FitMode,
    series: &EmpiricalSeries,
    moment: &DistParams,
    opts: &LmOptions,
) -> Result<FitOutcome, FreqError> {
    let name = mode.name();
    let problem = Problem {
        param,
        probs: &series.probs,
        observed: &series.values,
    };

    let solution = levenberg_marquardt(&problem, name, param.seed(moment), opts)?;
    let params = param.expand(&solution.theta);
    if !(params.is_finite() && params.cv > 0.0 && params.ex > 0.0) {
        return Err(FreqError::convergence(
            name,
            format!(
                "non-physical parameters EX={:.4}, Cv={:.4}, Cs={:.4}",
                params.ex, params.cv, params.cs
            ),
        ));
    }

    let n = series.len();
    let quality = FitQuality {
        sse: solution.sse,
        rmse: (solution.sse / n as f64).sqrt(),
        n,
        iterations: solution.iterations,
    };
    let std_errors = standard_errors(&problem, &solution, mode.free_names());

    Ok(FitOutcome {
        mode,
        params,
        quality,
        std_errors,
    })
}

struct Problem<'a, P> {
    param: &'a P,
    probs: &'a [f64],
    observed: &'a [f64],
}

impl<P: Parameterization> Problem<'_, P> {
    /// Predicted minus observed; `None` if any entry is non-finite.
    fn residuals(&self, theta: &[f64]) -> Option<DVector<f64>> {
        let params = self.param.expand(theta);
        let predicted = design_values(self.probs, &params).ok()?;
        let r = DVector::from_iterator(
            predicted.len(),
            predicted.iter().zip(self.observed).map(|(x, y)| x - y),
        );
        if r.iter().all(|v| v.is_finite()) { Some(r) } else { None }
    }

    fn jacobian(&self, theta: &[f64], r0: &DVector<f64>) -> Option<DMatrix<f64>> {
        let mut j = DMatrix::<f64>::zeros(r0.len(), theta.len());
        let mut shifted = theta.to_vec();
        for k in 0..theta.len() {
            let h = if theta[k] == 0.0 { FD_STEP } else { FD_STEP * theta[k].abs() };
            shifted[k] = theta[k] + h;
            let rk = self.residuals(&shifted)?;
            j.set_column(k, &((rk - r0) / h));
            shifted[k] = theta[k];
        }
        Some(j)
    }
}

struct Solution {
    theta: Vec<f64>,
    residuals: DVector<f64>,
    sse: f64,
    iterations: usize,
}

fn levenberg_marquardt<P: Parameterization>(
    problem: &Problem<'_, P>,
    name: &'static str,
    seed: Vec<f64>,
    opts: &LmOptions,
) -> Result<Solution, FreqError> {
    let m = problem.observed.len();
    let p = seed.len();

    let mut theta = seed;
    let mut r = problem
        .residuals(&theta)
        .ok_or_else(|| FreqError::convergence(name, "non-finite residuals at the initial guess"))?;
    let mut sse = r.norm_squared();
    let mut lambda = LAMBDA_INIT;

    for iteration in 1..=opts.max_iterations {
        if sse == 0.0 {
            return Ok(Solution { theta, residuals: r, sse, iterations: iteration - 1 });
        }

        let j = problem
            .jacobian(&theta, &r)
            .ok_or_else(|| FreqError::convergence(name, "non-finite Jacobian"))?;
        let jtj = j.transpose() * &j;
        let scale: Vec<f64> = (0..p).map(|k| jtj[(k, k)]).collect();
        if let Some(k) = scale.iter().position(|d| !(*d > 0.0 && d.is_finite())) {
            return Err(FreqError::convergence(
                name,
                format!("singular Jacobian: free parameter #{} does not move the curve", k + 1),
            ));
        }

        let mut rhs = DVector::<f64>::zeros(m + p);
        rhs.rows_mut(0, m).copy_from(&(-&r));

        // Inner loop: raise damping until a step reduces the SSE.
        loop {
            let mut damping = DMatrix::<f64>::zeros(p, p);
            for k in 0..p {
                damping[(k, k)] = (lambda * scale[k]).sqrt();
            }
            let delta = solve_least_squares(&stack_rows(&j, &damping), &rhs)
                .ok_or_else(|| FreqError::convergence(name, "singular Jacobian"))?;

            let theta_norm = theta.iter().map(|t| t * t).sum::<f64>().sqrt();
            let step_small = delta.norm() <= opts.xtol * (theta_norm + opts.xtol);
            let trial: Vec<f64> = theta.iter().zip(delta.iter()).map(|(t, d)| t + d).collect();

            match problem.residuals(&trial) {
                Some(rt) if rt.norm_squared() < sse => {
                    let sse_trial = rt.norm_squared();
                    let actual = (sse - sse_trial) / sse;
                    let predicted = (sse - (&r + &j * &delta).norm_squared()) / sse;

                    debug!(
                        mode = name,
                        iteration,
                        sse = sse_trial,
                        lambda,
                        "levenberg-marquardt step accepted"
                    );

                    theta = trial;
                    r = rt;
                    sse = sse_trial;
                    lambda = (lambda / 10.0).max(LAMBDA_MIN);

                    if (actual <= opts.ftol && predicted.abs() <= opts.ftol) || step_small {
                        return Ok(Solution { theta, residuals: r, sse, iterations: iteration });
                    }
                    break;
                }
                _ => {
                    // No improvement within xtol of θ: θ is the minimum.
                    if step_small {
                        return Ok(Solution { theta, residuals: r, sse, iterations: iteration });
                    }
                    lambda *= 10.0;
                    if lambda > LAMBDA_MAX {
                        return Err(FreqError::convergence(
                            name,
                            "damping exhausted without reducing the residual",
                        ));
                    }
                }
            }
        }
    }

    Err(FreqError::convergence(
        name,
        format!("iteration budget of {} exhausted", opts.max_iterations),
    ))
}

/// `sqrt(diag(s² (JᵀJ)⁻¹))` with `s² = SSE / (n - p)`.
fn standard_errors<P: Parameterization>(
    problem: &Problem<'_, P>,
    solution: &Solution,
    names: &'static [&'static str],
) -> Vec<ParamError> {
    let n = solution.residuals.len();
    let p = solution.theta.len();
    if n <= p {
        return Vec::new();
    }
    let Some(j) = problem.jacobian(&solution.theta, &solution.residuals) else {
        return Vec::new();
    };
    let Some(inv) = (j.transpose() * &j).try_inverse() else {
        return Vec::new();
    };

    let s2 = solution.sse / (n - p) as f64;
    names
        .iter()
        .zip(&solution.theta)
        .enumerate()
        .map(|(k, (&name, &value))| ParamError {
            name,
            value,
            std_error: (s2 * inv[(k, k)]).max(0.0).sqrt(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Sample, compute_statistics, position};
    use crate::domain::{FittingConfig, PlottingPosition, SkewEstimator};
    use approx::assert_relative_eq;

    fn worked_example() -> (EmpiricalSeries, DistParams) {
        let sample = Sample::worked_example();
        let stats = compute_statistics(&sample, SkewEstimator::Moment).unwrap();
        let series = position(&sample, PlottingPosition::Expectation).unwrap();
        (series, stats.moment_params())
    }

    fn moment_sse(series: &EmpiricalSeries, moment: &DistParams) -> f64 {
        let predicted = design_values(&series.probs, moment).unwrap();
        predicted
            .iter()
            .zip(&series.values)
            .map(|(x, y)| (x - y).powi(2))
            .sum()
    }

    #[test]
    fn full_fit_improves_on_moment_estimate() {
        let (series, moment) = worked_example();
        let fit = fit_curve(&series, &moment, FitMode::Full, &LmOptions::default()).unwrap();

        assert!(fit.params.is_finite());
        assert!(fit.params.cv > 0.0);
        assert!(fit.quality.sse < moment_sse(&series, &moment));
        assert_eq!(fit.quality.n, 24);
        assert_eq!(fit.std_errors.len(), 3);
        assert!(fit.std_errors.iter().all(|e| e.std_error.is_finite()));
    }

    #[test]
    fn fixed_ratio_keeps_cs_over_cv() {
        let (series, moment) = worked_example();
        for fit_ex in [true, false] {
            let config = FittingConfig { sv_ratio: 2.5, fit_ex };
            let mode = FitMode::resolve(&config, moment.ex).unwrap();
            let fit = fit_curve(&series, &moment, mode, &LmOptions::default()).unwrap();
            assert_relative_eq!(fit.params.skew_ratio(), 2.5, max_relative = 1e-12);
        }
    }

    #[test]
    fn fixed_mean_returns_sample_mean_exactly() {
        let (series, moment) = worked_example();
        for sv_ratio in [0.0, 3.0] {
            let config = FittingConfig { sv_ratio, fit_ex: false };
            let mode = FitMode::resolve(&config, moment.ex).unwrap();
            let fit = fit_curve(&series, &moment, mode, &LmOptions::default()).unwrap();
            assert_eq!(fit.params.ex, moment.ex);
        }
    }

    #[test]
    fn recovers_parameters_from_exact_curve() {
        let truth = DistParams::new(800.0, 0.35, 1.1);
        let n = 40;
        let probs: Vec<f64> = (1..=n).map(|m| PlottingPosition::Expectation.probability(m, n)).collect();
        let values = design_values(&probs, &truth).unwrap();
        let series = EmpiricalSeries {
            method: PlottingPosition::Expectation,
            values,
            order: (0..n).collect(),
            range: crate::data::display_range(probs[0]),
            probs,
        };

        let seed = DistParams::new(760.0, 0.3, 0.8);
        let fit = fit_curve(&series, &seed, FitMode::Full, &LmOptions::default()).unwrap();
        assert_relative_eq!(fit.params.ex, truth.ex, max_relative = 1e-5);
        assert_relative_eq!(fit.params.cv, truth.cv, max_relative = 1e-4);
        assert_relative_eq!(fit.params.cs, truth.cs, max_relative = 1e-3);
    }

    #[test]
    fn flat_seed_is_a_singular_jacobian() {
        // Cv = 0 makes the curve independent of Cs.
        let (series, moment) = worked_example();
        let seed = DistParams::new(moment.ex, 0.0, moment.cs);
        let err = fit_curve(&series, &seed, FitMode::Full, &LmOptions::default()).unwrap_err();
        assert!(matches!(err, FreqError::FittingConvergence { mode: "ex-cv-cs", .. }), "{err}");
    }

    #[test]
    fn exhausted_budget_is_reported() {
        let (series, moment) = worked_example();
        let seed = DistParams::new(moment.ex * 1.8, moment.cv * 2.5, moment.cs);
        let opts = LmOptions {
            max_iterations: 1,
            ..LmOptions::default()
        };
        let err = fit_curve(&series, &seed, FitMode::Full, &opts).unwrap_err();
        assert!(matches!(err, FreqError::FittingConvergence { .. }));
    }

    #[test]
    fn too_few_points_for_free_parameters() {
        let sample = Sample::new(vec![10.0, 20.0]).unwrap();
        let series = position(&sample, PlottingPosition::Expectation).unwrap();
        let seed = DistParams::new(15.0, 0.4, 0.5);
        let err = fit_curve(&series, &seed, FitMode::Full, &LmOptions::default()).unwrap_err();
        assert!(matches!(err, FreqError::FittingConvergence { .. }));
    }
}
