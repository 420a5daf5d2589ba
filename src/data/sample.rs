//! Annual peak-flow samples.

use serde::Serialize;

use crate::error::FreqError;

/// The bundled 24-year annual-peak record used by the worked example (m³/s).
pub const WORKED_EXAMPLE: [f64; 24] = [
    538.3, 624.9, 663.2, 591.7, 557.2, 998.0, 641.5, 341.1, 964.2, 687.3, 546.7, 509.9, 769.2,
    615.5, 417.1, 789.3, 732.9, 1064.5, 606.7, 586.7, 567.4, 587.7, 709.0, 883.5,
];

/// One observed annual peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub flow: f64,
    pub year: Option<i32>,
}

/// An immutable sample of positive peak flows, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    values: Vec<f64>,
    years: Vec<Option<i32>>,
}

impl Sample {
    /// Build a sample from bare flows.
    pub fn new(values: Vec<f64>) -> Result<Self, FreqError> {
        validate(&values)?;
        let years = vec![None; values.len()];
        Ok(Self { values, years })
    }

    /// Build a sample from observations carrying optional years.
    pub fn from_observations(observations: &[Observation]) -> Result<Self, FreqError> {
        let values: Vec<f64> = observations.iter().map(|o| o.flow).collect();
        validate(&values)?;
        let years = observations.iter().map(|o| o.year).collect();
        Ok(Self { values, years })
    }

    pub fn worked_example() -> Self {
        Self {
            values: WORKED_EXAMPLE.to_vec(),
            years: vec![None; WORKED_EXAMPLE.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn year(&self, index: usize) -> Option<i32> {
        self.years.get(index).copied().flatten()
    }

    /// First and last year of the record, if any observation is dated.
    pub fn record_period(&self) -> Option<(i32, i32)> {
        let mut years = self.years.iter().flatten();
        let first = *years.next()?;
        Some(years.fold((first, first), |(lo, hi), &y| (lo.min(y), hi.max(y))))
    }
}

fn validate(values: &[f64]) -> Result<(), FreqError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, v)| !(v.is_finite() && **v > 0.0))
    {
        Some((index, &value)) => Err(FreqError::InvalidObservation { index, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_non_finite_flows() {
        assert_eq!(
            Sample::new(vec![1.0, 0.0, 3.0]),
            Err(FreqError::InvalidObservation { index: 1, value: 0.0 })
        );
        assert!(Sample::new(vec![1.0, f64::INFINITY]).is_err());
        assert!(Sample::new(vec![-2.0]).is_err());
    }

    #[test]
    fn record_period_spans_dated_observations() {
        let obs = [
            Observation { flow: 10.0, year: Some(1990) },
            Observation { flow: 12.0, year: None },
            Observation { flow: 9.0, year: Some(1985) },
            Observation { flow: 15.0, year: Some(2001) },
        ];
        let sample = Sample::from_observations(&obs).unwrap();
        assert_eq!(sample.record_period(), Some((1985, 2001)));
        assert_eq!(sample.year(1), None);
        assert_eq!(sample.year(2), Some(1985));

        assert_eq!(Sample::worked_example().record_period(), None);
    }

    #[test]
    fn worked_example_has_24_years() {
        assert_eq!(Sample::worked_example().len(), 24);
    }
}
