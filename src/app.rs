//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - builds the analysis configuration
//! - runs the estimation pipeline
//! - prints text or JSON reports

use clap::Parser;

use crate::cli::{Command, FitArgs};
use crate::domain::{AnalysisConfig, DistParams, FittingConfig, SampleSource};
use crate::error::AppError;

pub mod pipeline;

/// Design value converted by default for the bundled worked example.
const WORKED_EXAMPLE_VALUE: f64 = 936.37;
/// Design frequency (%) converted when none is requested.
const DEFAULT_PROB: f64 = 10.0;

/// Entry point for the `ffa` binary.
pub fn run() -> Result<(), AppError> {
    // `ffa` and `ffa -i peaks.csv` behave like `ffa fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args, OutputMode::Full),
        Command::Design(args) => handle_fit(args, OutputMode::DesignOnly),
        Command::Stats(args) => handle_stats(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    DesignOnly,
}

fn handle_fit(args: FitArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = config_from_args(&args);
    let report = pipeline::run_analysis(&config)?;

    if args.json {
        return print_json(&report);
    }

    match mode {
        OutputMode::Full => println!("{}", crate::report::format_full_report(&report)),
        OutputMode::DesignOnly => {
            println!("{}", crate::report::format_params(&report.fit.params, true));
            println!("{}", crate::report::format_design_table(&report.design_table));
            print!(
                "{}",
                crate::report::format_conversions(&report.prob_to_value, &report.value_to_prob)
            );
        }
    }

    Ok(())
}

fn handle_stats(args: FitArgs) -> Result<(), AppError> {
    let config = config_from_args(&args);
    let (_, summary) = pipeline::run_statistics(&config)?;

    if args.json {
        return print_json(&summary);
    }

    print!("{}", crate::report::format_run_summary(&summary));
    print!("{}", crate::report::format_empirical_table(&summary));
    println!("{}", crate::report::format_params(&summary.statistics.moment_params(), false));
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(2, format!("Failed to serialize report: {e}")))?;
    println!("{json}");
    Ok(())
}

pub fn config_from_args(args: &FitArgs) -> AnalysisConfig {
    let source = if let Some(path) = &args.input {
        SampleSource::Csv {
            path: path.clone(),
            column: args.column.clone(),
        }
    } else if let Some(values) = &args.values {
        SampleSource::Values(values.clone())
    } else if let Some(n) = args.synthetic {
        SampleSource::Synthetic {
            n,
            params: DistParams::new(args.synthetic_ex, args.synthetic_cv, args.synthetic_cs),
            seed: args.seed,
        }
    } else {
        SampleSource::WorkedExample
    };

    let design_probs = if args.prob.is_empty() {
        vec![DEFAULT_PROB]
    } else {
        args.prob.clone()
    };
    let design_values = if args.value.is_empty() && source == SampleSource::WorkedExample {
        vec![WORKED_EXAMPLE_VALUE]
    } else {
        args.value.clone()
    };

    AnalysisConfig {
        source,
        skew: args.skew,
        positions: args.positions,
        fitting: FittingConfig {
            sv_ratio: args.sv_ratio,
            fit_ex: !args.fix_ex,
        },
        max_iterations: args.max_iter,
        design_probs,
        design_values,
        curve_points: args.curve_points,
    }
}

/// Rewrite argv so `ffa` defaults to `ffa fit`.
///
/// Rules:
/// - `ffa`                       -> `ffa fit`
/// - `ffa -i peaks.csv ...`      -> `ffa fit -i peaks.csv ...`
/// - `ffa --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "design" | "stats");
    if is_subcommand {
        return argv;
    }

    // A leading flag means "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn parse_fit(line: &str) -> FitArgs {
        let cli = Cli::parse_from(rewrite_args(args(line)));
        match cli.command {
            Command::Fit(a) | Command::Design(a) | Command::Stats(a) => a,
        }
    }

    #[test]
    fn bare_invocation_defaults_to_fit() {
        assert_eq!(rewrite_args(args("ffa")), args("ffa fit"));
        assert_eq!(rewrite_args(args("ffa -i x.csv")), args("ffa fit -i x.csv"));
        assert_eq!(rewrite_args(args("ffa stats")), args("ffa stats"));
        assert_eq!(rewrite_args(args("ffa --help")), args("ffa --help"));
    }

    #[test]
    fn worked_example_defaults() {
        let config = config_from_args(&parse_fit("ffa"));
        assert_eq!(config.source, SampleSource::WorkedExample);
        assert_eq!(config.design_probs, vec![10.0]);
        assert_eq!(config.design_values, vec![936.37]);
        assert_eq!(config.fitting, FittingConfig::default());
        assert_eq!(config.curve_points, 1000);
        assert_eq!(config.max_iterations, 1000);
    }

    #[test]
    fn fitting_flags_map_to_config() {
        let config = config_from_args(&parse_fit("ffa fit --values 1,2,3,4,5 --sv-ratio 2.5 --fix-ex -p 1,5"));
        assert_eq!(config.source, SampleSource::Values(vec![1.0, 2.0, 3.0, 4.0, 5.0]));
        assert_eq!(config.fitting, FittingConfig { sv_ratio: 2.5, fit_ex: false });
        assert_eq!(config.design_probs, vec![1.0, 5.0]);
        // Only the worked example gets a default value conversion.
        assert!(config.design_values.is_empty());
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::parse_from(args("ffa stats -vv --synthetic 30"));
        assert_eq!(cli.verbose, 2);
        let Command::Stats(a) = cli.command else {
            panic!("expected stats");
        };
        let config = config_from_args(&a);
        assert!(matches!(config.source, SampleSource::Synthetic { n: 30, seed: 42, .. }));
    }
}
