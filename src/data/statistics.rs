//! Sample statistics: mean, coefficient of variation, coefficient of skew.
//!
//! All three are computed on the modulus ratios `K_i = x_i / EX`:
//!
//! - `Cv = sqrt( Σ(K_i - 1)² / (n - 1) )`
//! - `Cs` (moment)   = `Σ(K_i - 1)³ / ((n - 3) · Cv³)`
//! - `Cs` (standard) = `g1 · sqrt(n(n-1)) / (n-2)` with `g1 = m3 / m2^1.5` on the raw values

use crate::data::Sample;
use crate::domain::{SampleStatistics, SkewEstimator};
use crate::error::FreqError;

pub fn compute_statistics(sample: &Sample, estimator: SkewEstimator) -> Result<SampleStatistics, FreqError> {
    let n = sample.len();
    let min = estimator.min_sample();
    if n < min {
        return Err(FreqError::InsufficientSample { n, min, estimator });
    }

    let values = sample.values();
    if values.iter().all(|&v| v == values[0]) {
        return Err(FreqError::ConstantSample { value: values[0] });
    }

    let nf = n as f64;
    let expectation = values.iter().sum::<f64>() / nf;
    let modulus_ratios: Vec<f64> = values.iter().map(|x| x / expectation).collect();

    let sum_sq: f64 = modulus_ratios.iter().map(|k| (k - 1.0).powi(2)).sum();
    let coeff_of_var = (sum_sq / (nf - 1.0)).sqrt();

    let coeff_of_skew = match estimator {
        SkewEstimator::Moment => {
            let sum_cube: f64 = modulus_ratios.iter().map(|k| (k - 1.0).powi(3)).sum();
            sum_cube / ((nf - 3.0) * coeff_of_var.powi(3))
        }
        SkewEstimator::Standard => unbiased_skewness(values, expectation),
    };

    Ok(SampleStatistics {
        n,
        estimator,
        expectation,
        modulus_ratios,
        coeff_of_var,
        coeff_of_skew,
    })
}

fn unbiased_skewness(values: &[f64], mean: f64) -> f64 {
    let nf = values.len() as f64;
    let m2 = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / nf;
    let g1 = m3 / m2.powf(1.5);
    g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn worked_example_statistics() {
        let sample = Sample::worked_example();
        let moment = compute_statistics(&sample, SkewEstimator::Moment).unwrap();
        assert_eq!(moment.n, 24);
        assert_abs_diff_eq!(moment.expectation, 666.395_833_333, epsilon = 1e-6);
        assert_abs_diff_eq!(moment.coeff_of_var, 0.263_312_221, epsilon = 1e-8);
        assert_abs_diff_eq!(moment.coeff_of_skew, 0.686_142_415, epsilon = 1e-8);

        let standard = compute_statistics(&sample, SkewEstimator::Standard).unwrap();
        assert_eq!(standard.expectation, moment.expectation);
        assert_eq!(standard.coeff_of_var, moment.coeff_of_var);
        assert_abs_diff_eq!(standard.coeff_of_skew, 0.683_430_389, epsilon = 1e-8);
    }

    #[test]
    fn statistics_are_deterministic() {
        let sample = Sample::worked_example();
        let a = compute_statistics(&sample, SkewEstimator::Moment).unwrap();
        let b = compute_statistics(&sample, SkewEstimator::Moment).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn coefficient_of_variation_is_scale_invariant() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let values: Vec<f64> = (0..30).map(|_| rng.gen_range(50.0..2000.0)).collect();
            let factor = rng.gen_range(0.01..100.0);
            let scaled: Vec<f64> = values.iter().map(|v| v * factor).collect();

            let a = compute_statistics(&Sample::new(values).unwrap(), SkewEstimator::Moment).unwrap();
            let b = compute_statistics(&Sample::new(scaled).unwrap(), SkewEstimator::Moment).unwrap();
            assert_relative_eq!(a.coeff_of_var, b.coeff_of_var, max_relative = 1e-10);
            assert_relative_eq!(a.coeff_of_skew, b.coeff_of_skew, max_relative = 1e-8);
        }
    }

    #[test]
    fn symmetric_sample_has_zero_skew() {
        let sample = Sample::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        for estimator in [SkewEstimator::Moment, SkewEstimator::Standard] {
            let stats = compute_statistics(&sample, estimator).unwrap();
            assert_abs_diff_eq!(stats.coeff_of_skew, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn modulus_ratios_average_to_one() {
        let stats = compute_statistics(&Sample::worked_example(), SkewEstimator::Moment).unwrap();
        let mean: f64 = stats.modulus_ratios.iter().sum::<f64>() / stats.n as f64;
        assert_abs_diff_eq!(mean, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn single_observation_is_insufficient() {
        let sample = Sample::new(vec![120.0]).unwrap();
        let err = compute_statistics(&sample, SkewEstimator::Moment).unwrap_err();
        assert_eq!(
            err,
            FreqError::InsufficientSample {
                n: 1,
                min: 4,
                estimator: SkewEstimator::Moment
            }
        );
    }

    #[test]
    fn three_observations_depend_on_estimator() {
        let sample = Sample::new(vec![1.0, 2.0, 4.0]).unwrap();
        assert!(matches!(
            compute_statistics(&sample, SkewEstimator::Moment),
            Err(FreqError::InsufficientSample { n: 3, min: 4, .. })
        ));
        let stats = compute_statistics(&sample, SkewEstimator::Standard).unwrap();
        assert!(stats.coeff_of_skew.is_finite());
    }

    #[test]
    fn constant_sample_is_rejected() {
        let sample = Sample::new(vec![5.0; 6]).unwrap();
        assert_eq!(
            compute_statistics(&sample, SkewEstimator::Moment),
            Err(FreqError::ConstantSample { value: 5.0 })
        );
    }
}
