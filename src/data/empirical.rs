//! Empirical exceedance probabilities (plotting positions).
//!
//! The sample is ranked descending (rank 1 = largest flow = smallest
//! probability) and each rank gets a probability from the chosen formula.
//! The probability-axis display range is derived from the first rank:
//!
//! - left = 1 when `p₁ > 1`, else `10^(ceil(log10 p₁) - 1)`
//! - right = 100 - left

use std::cmp::Ordering;

use crate::data::Sample;
use crate::domain::{EmpiricalSeries, PlottingPosition, ProbRange};
use crate::error::FreqError;

pub fn position(sample: &Sample, method: PlottingPosition) -> Result<EmpiricalSeries, FreqError> {
    let n = sample.len();
    if n == 0 {
        return Err(FreqError::domain("n", 0.0, "cannot position an empty sample"));
    }

    let values = sample.values();
    // Stable sort: tied flows keep sample order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));

    let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
    let probs: Vec<f64> = (1..=n).map(|rank| method.probability(rank, n)).collect();
    let range = display_range(probs[0]);

    Ok(EmpiricalSeries {
        method,
        values: sorted,
        probs,
        order,
        range,
    })
}

/// Probability-axis display range for the smallest empirical probability.
pub fn display_range(first_prob: f64) -> ProbRange {
    let left = if first_prob > 1.0 {
        1.0
    } else {
        10f64.powf(first_prob.log10().ceil() - 1.0)
    };
    ProbRange {
        left,
        right: 100.0 - left,
    }
}
