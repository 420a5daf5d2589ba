//! Shared analysis pipeline used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load sample -> statistics -> plotting positions -> moment fit -> optimize
//! -> curves, design table, conversions
//!
//! The subcommands can then focus on presentation (text vs JSON).

use tracing::info;

use crate::data::{Sample, generate_sample};
use crate::domain::{AnalysisConfig, SampleSource};
use crate::error::AppError;
use crate::estimator::FrequencyEstimator;
use crate::fit::LmOptions;
use crate::io::load_sample;
use crate::report::{
    AnalysisReport, ProbToValue, StatisticsReport, ValueToProb, curve_points, design_table,
    STANDARD_PROBS,
};

/// A loaded sample with a human-readable description of where it came from.
#[derive(Debug, Clone)]
pub struct LoadedSample {
    pub sample: Sample,
    pub source: String,
}

pub fn load(source: &SampleSource) -> Result<LoadedSample, AppError> {
    let (sample, label) = match source {
        SampleSource::Csv { path, column } => {
            let ingested = load_sample(path, column.as_deref())?;
            info!(
                path = %path.display(),
                column = %ingested.flow_column,
                rows_read = ingested.rows_read,
                rows_skipped = ingested.row_errors.len(),
                "loaded CSV sample"
            );
            let label = format!("{} (column `{}`)", path.display(), ingested.flow_column);
            (ingested.sample, label)
        }
        SampleSource::Values(values) => (Sample::new(values.clone())?, "command-line values".to_string()),
        SampleSource::Synthetic { n, params, seed } => {
            let sample = generate_sample(*n, params, *seed)?;
            let label = format!(
                "synthetic Pearson III (EX={}, Cv={}, Cs={}, seed={seed})",
                params.ex, params.cv, params.cs
            );
            (sample, label)
        }
        SampleSource::WorkedExample => (Sample::worked_example(), "bundled 24-year worked example".to_string()),
    };

    Ok(LoadedSample { sample, source: label })
}

/// Statistics and plotting positions only.
pub fn run_statistics(config: &AnalysisConfig) -> Result<(FrequencyEstimator, StatisticsReport), AppError> {
    let loaded = load(&config.source)?;
    info!(n = loaded.sample.len(), source = %loaded.source, "sample ready");

    let mut estimator =
        FrequencyEstimator::new(loaded.sample, config.skew).with_plotting_position(config.positions);

    let stats = estimator.compute_statistics()?.clone();
    info!(
        ex = stats.expectation,
        cv = stats.coeff_of_var,
        cs = stats.coeff_of_skew,
        estimator = %stats.estimator,
        "sample statistics computed"
    );

    let empirical = estimator.position()?.clone();
    info!(
        method = ?empirical.method,
        left = empirical.range.left,
        right = empirical.range.right,
        "empirical positions assigned"
    );

    let sample = estimator.sample();
    let report = StatisticsReport {
        source: loaded.source,
        n: sample.len(),
        record_period: sample.record_period(),
        ranked_years: empirical.order.iter().map(|&i| sample.year(i)).collect(),
        statistics: stats,
        empirical,
    };
    Ok((estimator, report))
}

/// Execute the full pipeline.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisReport, AppError> {
    let (mut estimator, summary) = run_statistics(config)?;

    let moment = estimator.moment_fit()?;

    let opts = LmOptions {
        max_iterations: config.max_iterations,
        ..LmOptions::default()
    };
    let fit = estimator.optimize(&config.fitting, &opts)?.clone();
    info!(
        mode = fit.mode.name(),
        ex = fit.params.ex,
        cv = fit.params.cv,
        cs = fit.params.cs,
        sse = fit.quality.sse,
        iterations = fit.quality.iterations,
        "curve fitted"
    );

    let moment_curve = curve_points(estimator.moment_curve(config.curve_points)?);
    let fitted_curve = curve_points(estimator.fitted_curve(config.curve_points)?);
    let design_table = design_table(&fit.params, &STANDARD_PROBS)?;

    let prob_to_value = config
        .design_probs
        .iter()
        .map(|&prob| {
            let value = estimator.prob_to_value(prob)?;
            Ok(ProbToValue { prob, value })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    let value_to_prob = config
        .design_values
        .iter()
        .map(|&value| {
            let prob = estimator.value_to_prob(value)?;
            Ok(ValueToProb { value, prob })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(AnalysisReport {
        summary,
        moment,
        fit,
        moment_curve,
        fitted_curve,
        design_table,
        prob_to_value,
        value_to_prob,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DistParams, FittingConfig, PlottingPosition, SkewEstimator};

    fn config(source: SampleSource) -> AnalysisConfig {
        AnalysisConfig {
            source,
            skew: SkewEstimator::Moment,
            positions: PlottingPosition::Expectation,
            fitting: FittingConfig::default(),
            max_iterations: 1000,
            design_probs: vec![1.0, 10.0],
            design_values: vec![936.37],
            curve_points: 200,
        }
    }

    #[test]
    fn worked_example_runs_end_to_end() {
        let report = run_analysis(&config(SampleSource::WorkedExample)).unwrap();
        assert_eq!(report.summary.n, 24);
        assert_eq!(report.moment_curve.len(), 200);
        assert_eq!(report.fitted_curve.len(), 200);
        assert_eq!(report.design_table.len(), STANDARD_PROBS.len());
        assert_eq!(report.prob_to_value.len(), 2);
        assert!(report.prob_to_value[0].value > report.prob_to_value[1].value);
        let p = report.value_to_prob[0].prob;
        assert!(p > 0.0 && p < 100.0);
    }

    #[test]
    fn synthetic_source_is_reproducible() {
        let source = SampleSource::Synthetic {
            n: 60,
            params: DistParams::new(500.0, 0.4, 1.0),
            seed: 3,
        };
        let mut cfg = config(source);
        cfg.design_values.clear();
        let a = run_analysis(&cfg).unwrap();
        let b = run_analysis(&cfg).unwrap();
        assert_eq!(a.fit.params, b.fit.params);
        assert!(a.summary.source.starts_with("synthetic"));
    }

    #[test]
    fn errors_map_to_exit_codes() {
        let err = run_statistics(&config(SampleSource::Values(vec![1.0]))).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let mut cfg = config(SampleSource::WorkedExample);
        cfg.design_probs = vec![100.0];
        assert_eq!(run_analysis(&cfg).unwrap_err().exit_code(), 2);
    }
}
