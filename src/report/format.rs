//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized
//!
//! Parameter and conversion lines keep the conventional report precision:
//! 2 decimals for EX and values, 4 for Cv, Cs and probabilities.

use crate::domain::DistParams;
use crate::fit::FitOutcome;
use crate::report::{AnalysisReport, DesignPoint, ProbToValue, StatisticsReport, ValueToProb};

/// Header block: source, sample size, estimator choices.
pub fn format_run_summary(summary: &StatisticsReport) -> String {
    let mut out = String::new();

    out.push_str("=== ffa - Pearson III flood frequency analysis ===\n");
    out.push_str(&format!("Source: {}\n", summary.source));
    match summary.record_period {
        Some((first, last)) => out.push_str(&format!("Sample: n={} | years {first}-{last}\n", summary.n)),
        None => out.push_str(&format!("Sample: n={}\n", summary.n)),
    }
    out.push_str(&format!(
        "Skew estimator: {} | plotting position: {}\n",
        summary.statistics.estimator,
        summary.empirical.method.display_name()
    ));
    out.push_str(&format!(
        "Probability axis: [{}, {}]%\n",
        fmt_prob_bound(summary.empirical.range.left),
        fmt_prob_bound(summary.empirical.range.right)
    ));
    out.push('\n');

    out
}

/// The three parameter lines; `fitted` selects the post-fitting heading.
pub fn format_params(params: &DistParams, fitted: bool) -> String {
    let mut out = String::new();
    out.push_str(if fitted { "适线后:\n" } else { "矩法估计:\n" });
    out.push_str(&format!("期望 EX 为 {:.2}\n", params.ex));
    out.push_str(&format!("变差系数 Cv 为 {:.4}\n", params.cv));
    out.push_str(&format!("偏态系数 Cs 为 {:.4}\n", params.cs));
    out
}

/// Ranked sample with plotting positions.
pub fn format_empirical_table(summary: &StatisticsReport) -> String {
    let series = &summary.empirical;
    let dated = summary.ranked_years.iter().any(Option::is_some);

    let mut out = String::new();
    out.push_str("Empirical series:\n");
    if dated {
        out.push_str(&format!("{:>5} {:>6} {:>12} {:>10}\n", "rank", "year", "value", "prob %"));
        out.push_str(&format!("{:->5} {:->6} {:->12} {:->10}\n", "", "", "", ""));
    } else {
        out.push_str(&format!("{:>5} {:>12} {:>10}\n", "rank", "value", "prob %"));
        out.push_str(&format!("{:->5} {:->12} {:->10}\n", "", "", ""));
    }

    for (i, (value, prob)) in series.values.iter().zip(&series.probs).enumerate() {
        if dated {
            let year = summary
                .ranked_years
                .get(i)
                .copied()
                .flatten()
                .map(|y| y.to_string())
                .unwrap_or_default();
            out.push_str(&format!("{:>5} {:>6} {:>12.2} {:>10.4}\n", i + 1, year, value, prob));
        } else {
            out.push_str(&format!("{:>5} {:>12.2} {:>10.4}\n", i + 1, value, prob));
        }
    }
    out.push('\n');

    out
}

/// Optimizer mode, diagnostics and standard errors.
pub fn format_fit_diagnostics(fit: &FitOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Fit: mode={} | SSE={:.3} RMSE={:.3} | n={} | iterations={}\n",
        fit.mode.name(),
        fit.quality.sse,
        fit.quality.rmse,
        fit.quality.n,
        fit.quality.iterations
    ));
    for e in &fit.std_errors {
        out.push_str(&format!("  {:<3} = {:>12.4} ± {:.4}\n", e.name, e.value, e.std_error));
    }
    out.push('\n');
    out
}

pub fn format_design_table(rows: &[DesignPoint]) -> String {
    let mut out = String::new();
    out.push_str("Design table:\n");
    out.push_str(&format!("{:>10} {:>12} {:>12}\n", "prob %", "T (years)", "value"));
    out.push_str(&format!("{:->10} {:->12} {:->12}\n", "", "", ""));
    for r in rows {
        out.push_str(&format!(
            "{:>10.4} {:>12.1} {:>12.2}\n",
            r.prob, r.return_period, r.value
        ));
    }
    out.push('\n');
    out
}

pub fn format_conversions(to_value: &[ProbToValue], to_prob: &[ValueToProb]) -> String {
    let mut out = String::new();
    for c in to_value {
        out.push_str(&format!("{:.4}% 的设计频率对应的设计值为 {:.2}\n", c.prob, c.value));
    }
    for c in to_prob {
        out.push_str(&format!("{:.2} 的设计值对应的设计频率为 {:.4}%\n", c.value, c.prob));
    }
    out
}

/// Everything the `fit` command prints.
pub fn format_full_report(report: &AnalysisReport) -> String {
    let mut out = format_run_summary(&report.summary);
    out.push_str(&format_empirical_table(&report.summary));
    out.push_str(&format_params(&report.moment, false));
    out.push('\n');
    out.push_str(&format_params(&report.fit.params, true));
    out.push('\n');
    out.push_str(&format_fit_diagnostics(&report.fit));
    out.push_str(&format_design_table(&report.design_table));
    out.push_str(&format_conversions(&report.prob_to_value, &report.value_to_prob));
    out
}

/// Probability-axis bounds print without trailing zeros (`0.1`, `99.9`, `1`).
fn fmt_prob_bound(v: f64) -> String {
    let s = format!("{v:.6}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_use_report_precision() {
        let p = DistParams::new(666.395_833, 0.263_312_2, 0.686_142_4);
        assert_eq!(
            format_params(&p, false),
            "矩法估计:\n期望 EX 为 666.40\n变差系数 Cv 为 0.2633\n偏态系数 Cs 为 0.6861\n"
        );
        assert!(format_params(&p, true).starts_with("适线后:\n"));
    }

    #[test]
    fn conversion_lines() {
        let out = format_conversions(
            &[ProbToValue { prob: 10.0, value: 903.456 }],
            &[ValueToProb { value: 936.37, prob: 7.123_456 }],
        );
        assert_eq!(
            out,
            "10.0000% 的设计频率对应的设计值为 903.46\n936.37 的设计值对应的设计频率为 7.1235%\n"
        );
    }

    #[test]
    fn prob_bounds_trim_zeros() {
        assert_eq!(fmt_prob_bound(1.0), "1");
        assert_eq!(fmt_prob_bound(0.1), "0.1");
        assert_eq!(fmt_prob_bound(99.9), "99.9");
    }
}
