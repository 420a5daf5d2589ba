//! The bundled 24-year record analysed end to end through the public API.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use flood_frequency::data::{Sample, WORKED_EXAMPLE};
use flood_frequency::domain::{FittingConfig, SkewEstimator, Stage};
use flood_frequency::error::FreqError;
use flood_frequency::estimator::FrequencyEstimator;
use flood_frequency::fit::LmOptions;

fn run(skew: SkewEstimator, config: &FittingConfig) -> FrequencyEstimator {
    let mut est = FrequencyEstimator::new(Sample::worked_example(), skew);
    est.compute_statistics().unwrap();
    est.position().unwrap();
    est.moment_fit().unwrap();
    est.optimize(config, &LmOptions::default()).unwrap();
    est
}

#[test]
fn moment_statistics() {
    let est = run(SkewEstimator::Moment, &FittingConfig::default());
    let stats = est.statistics().unwrap();
    assert_eq!(stats.n, 24);
    assert_abs_diff_eq!(stats.expectation, 666.395_833_333_333_4, epsilon = 1e-9);
    assert_abs_diff_eq!(stats.coeff_of_var, 0.263_312_221_261_256_5, epsilon = 1e-9);
    assert_abs_diff_eq!(stats.coeff_of_skew, 0.686_142_414_754_342_3, epsilon = 1e-9);

    let standard = run(SkewEstimator::Standard, &FittingConfig::default());
    let s = standard.statistics().unwrap();
    assert_abs_diff_eq!(s.coeff_of_skew, 0.683_430_389_399_582_2, epsilon = 1e-9);
    assert_eq!(s.coeff_of_var, stats.coeff_of_var);
}

#[test]
fn analysis_is_deterministic() {
    let a = run(SkewEstimator::Moment, &FittingConfig::default());
    let b = run(SkewEstimator::Moment, &FittingConfig::default());
    assert_eq!(a.statistics(), b.statistics());
    assert_eq!(a.fitted().unwrap().params, b.fitted().unwrap().params);
    assert_eq!(a.prob_to_value(10.0).unwrap(), b.prob_to_value(10.0).unwrap());
}

#[test]
fn design_conversions() {
    let est = run(SkewEstimator::Moment, &FittingConfig::default());
    assert_eq!(est.stage(), Stage::OptimallyFitted);

    let q10 = est.prob_to_value(10.0).unwrap();
    assert!(q10.is_finite() && q10 > 0.0);
    assert!(q10 > 800.0 && q10 < 1000.0, "Q10% = {q10}");

    let p = est.value_to_prob(936.37).unwrap();
    assert!(p > 0.0 && p < 100.0);
    assert_relative_eq!(est.prob_to_value(p).unwrap(), 936.37, max_relative = 1e-6);
}

#[test]
fn every_fitting_mode_converges() {
    let mean = WORKED_EXAMPLE.iter().sum::<f64>() / WORKED_EXAMPLE.len() as f64;
    for (sv_ratio, fit_ex) in [(0.0, true), (0.0, false), (2.0, true), (2.0, false)] {
        let est = run(SkewEstimator::Moment, &FittingConfig { sv_ratio, fit_ex });
        let fit = est.fitted().unwrap();
        assert!(fit.params.cv > 0.0);
        if sv_ratio != 0.0 {
            assert_relative_eq!(fit.params.cs / fit.params.cv, sv_ratio, max_relative = 1e-12);
        }
        if !fit_ex {
            assert_eq!(fit.params.ex, mean);
        }
    }
}

#[test]
fn single_observation_is_insufficient() {
    let mut est = FrequencyEstimator::new(Sample::new(vec![538.3]).unwrap(), SkewEstimator::Moment);
    let err = est.compute_statistics().unwrap_err();
    assert!(matches!(err, FreqError::InsufficientSample { n: 1, .. }));

    let mut est = FrequencyEstimator::new(Sample::new(vec![538.3]).unwrap(), SkewEstimator::Standard);
    assert!(matches!(
        est.compute_statistics(),
        Err(FreqError::InsufficientSample { n: 1, min: 3, .. })
    ));
}
