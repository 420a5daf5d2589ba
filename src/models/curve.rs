//! Pearson III frequency curve in (probability, value) space.
//!
//! The fitter and the quantile operations rely on two primitive operations:
//! - design value at an exceedance probability `p` (percent):
//!   `x = (Φ⁻¹(1 - p/100; Cs) · Cv + 1) · EX`
//! - design frequency of a value:
//!   `p = 100 - F((x/EX - 1) / Cv; Cs) · 100`
//!
//! where `Φ⁻¹` / `F` are the standardized Pearson III quantile and CDF.

use crate::domain::{DistParams, ProbRange};
use crate::error::FreqError;
use crate::math::{StdPearson3, lin_space};

/// Validate an exceedance probability (percent) against the open interval `(0, 100)`.
pub fn check_prob(prob: f64) -> Result<(), FreqError> {
    if prob.is_finite() && prob > 0.0 && prob < 100.0 {
        Ok(())
    } else {
        Err(FreqError::domain(
            "prob",
            prob,
            "exceedance probability must lie in the open interval (0, 100)",
        ))
    }
}

/// Design value for a single exceedance probability.
pub fn design_value(prob: f64, params: &DistParams) -> Result<f64, FreqError> {
    check_prob(prob)?;
    let dist = StdPearson3::new(params.cs)?;
    value_at(&dist, prob, params)
}

/// Design values for many probabilities, building the distribution once.
pub fn design_values(probs: &[f64], params: &DistParams) -> Result<Vec<f64>, FreqError> {
    for &p in probs {
        check_prob(p)?;
    }
    let dist = StdPearson3::new(params.cs)?;
    probs.iter().map(|&p| value_at(&dist, p, params)).collect()
}

/// Exceedance probability (percent) of a design value.
pub fn design_prob(value: f64, params: &DistParams) -> Result<f64, FreqError> {
    if !value.is_finite() {
        return Err(FreqError::domain("value", value, "design value must be finite"));
    }
    if !(params.cv > 0.0 && params.ex != 0.0 && params.is_finite()) {
        return Err(FreqError::domain(
            "cv",
            params.cv,
            "distribution parameters must be finite with Cv > 0 and EX != 0",
        ));
    }

    let dist = StdPearson3::new(params.cs)?;
    let x = (value / params.ex - 1.0) / params.cv;
    if !dist.contains(x) {
        let bound = dist
            .support_bound()
            .map(|b| (b * params.cv + 1.0) * params.ex)
            .unwrap_or(f64::NAN);
        return Err(FreqError::domain(
            "value",
            value,
            format!("outside the support of the fitted distribution (bound {bound:.4})"),
        ));
    }

    Ok(100.0 - dist.cdf(x) * 100.0)
}

/// Sample the theoretical curve on an `n`-point linear grid over `range`.
pub fn sample_curve(params: &DistParams, range: ProbRange, n: usize) -> Result<Vec<(f64, f64)>, FreqError> {
    let probs = lin_space(range.left, range.right, n)?;
    let values = design_values(&probs, params)?;
    Ok(probs.into_iter().zip(values).collect())
}

/// Non-finite results come from probabilities so close to 0 or 100 that the
/// non-exceedance probability rounds to 1 or 0.
fn value_at(dist: &StdPearson3, prob: f64, params: &DistParams) -> Result<f64, FreqError> {
    let value = (dist.inverse_cdf(1.0 - prob / 100.0) * params.cv + 1.0) * params.ex;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FreqError::domain(
            "prob",
            prob,
            "exceedance probability too close to 0 or 100 for a finite design value",
        ))
    }
}
