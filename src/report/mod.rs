//! Run results as handed to presentation: terminal text or JSON.
//!
//! The structs here are the whole core-to-presentation contract: the empirical
//! series with its axis bounds, the moment and fitted triples, both theoretical
//! curves, the design table and the requested conversions.

pub mod format;

use serde::Serialize;

use crate::domain::{DistParams, EmpiricalSeries, SampleStatistics};
use crate::error::FreqError;
use crate::fit::FitOutcome;
use crate::models::design_values;

pub use format::*;

/// Exceedance probabilities (percent) tabulated by default.
pub const STANDARD_PROBS: [f64; 14] = [
    0.01, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 75.0, 90.0, 95.0, 99.0,
];

/// One row of the design table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignPoint {
    pub prob: f64,
    /// `100 / prob` years.
    pub return_period: f64,
    pub value: f64,
}

/// A point on a theoretical curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub prob: f64,
    pub value: f64,
}

/// A requested design-frequency → design-value conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbToValue {
    pub prob: f64,
    pub value: f64,
}

/// A requested design-value → design-frequency conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueToProb {
    pub value: f64,
    pub prob: f64,
}

/// Statistics stage output (the `stats` command).
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport {
    pub source: String,
    pub n: usize,
    pub record_period: Option<(i32, i32)>,
    /// Year label per ranked value, when the sample is dated.
    pub ranked_years: Vec<Option<i32>>,
    pub statistics: SampleStatistics,
    pub empirical: EmpiricalSeries,
}

/// Full analysis output (the `fit` and `design` commands).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub summary: StatisticsReport,
    pub moment: DistParams,
    pub fit: FitOutcome,
    pub moment_curve: Vec<CurvePoint>,
    pub fitted_curve: Vec<CurvePoint>,
    pub design_table: Vec<DesignPoint>,
    pub prob_to_value: Vec<ProbToValue>,
    pub value_to_prob: Vec<ValueToProb>,
}

/// Design values at the given exceedance probabilities.
pub fn design_table(params: &DistParams, probs: &[f64]) -> Result<Vec<DesignPoint>, FreqError> {
    let values = design_values(probs, params)?;
    Ok(probs
        .iter()
        .zip(values)
        .map(|(&prob, value)| DesignPoint {
            prob,
            return_period: 100.0 / prob,
            value,
        })
        .collect())
}

pub fn curve_points(curve: Vec<(f64, f64)>) -> Vec<CurvePoint> {
    curve
        .into_iter()
        .map(|(prob, value)| CurvePoint { prob, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn design_table_is_monotone_with_return_periods() {
        let params = DistParams::new(666.4, 0.26, 0.69);
        let table = design_table(&params, &STANDARD_PROBS).unwrap();
        assert_eq!(table.len(), STANDARD_PROBS.len());
        assert_relative_eq!(table[0].return_period, 10_000.0);
        assert_relative_eq!(table[7].return_period, 10.0);
        assert!(table.windows(2).all(|w| w[1].value < w[0].value));
    }

    #[test]
    fn design_table_rejects_boundary_probabilities() {
        let params = DistParams::new(100.0, 0.3, 0.5);
        assert!(design_table(&params, &[0.0]).is_err());
        assert!(design_table(&params, &[100.0]).is_err());
    }
}
