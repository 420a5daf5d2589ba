//! Command-line parsing for the flood-frequency analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{PlottingPosition, SkewEstimator};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ffa", version, about = "Pearson III flood frequency analysis")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the curve and print statistics, both parameter sets, diagnostics,
    /// the design table and the requested conversions.
    Fit(FitArgs),
    /// Print only the design table and conversions (useful for scripting).
    Design(FitArgs),
    /// Print sample statistics and plotting positions without fitting.
    Stats(FitArgs),
}

/// Common options for every command.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// CSV file with annual peaks (a flow column plus optional `year`/`date`).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Flow column in the CSV (default: first of flow, peak, q, discharge, value).
    #[arg(long, requires = "input")]
    pub column: Option<String>,

    /// Comma-separated flows given directly.
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with = "input")]
    pub values: Option<Vec<f64>>,

    /// Draw N synthetic peaks from a Pearson III instead of reading data.
    #[arg(long, value_name = "N", conflicts_with_all = ["input", "values"])]
    pub synthetic: Option<usize>,

    /// Mean of the synthetic distribution.
    #[arg(long, default_value_t = 1000.0)]
    pub synthetic_ex: f64,

    /// Coefficient of variation of the synthetic distribution.
    #[arg(long, default_value_t = 0.3)]
    pub synthetic_cv: f64,

    /// Coefficient of skew of the synthetic distribution.
    #[arg(long, default_value_t = 0.9, allow_negative_numbers = true)]
    pub synthetic_cs: f64,

    /// Random seed for synthetic samples.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Skew estimator.
    #[arg(long, value_enum, default_value_t = SkewEstimator::Moment)]
    pub skew: SkewEstimator,

    /// Plotting-position formula for empirical probabilities.
    #[arg(long, value_enum, default_value_t = PlottingPosition::Expectation)]
    pub positions: PlottingPosition,

    /// Fix Cs = ratio · Cv during fitting (0 leaves Cs free).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub sv_ratio: f64,

    /// Hold EX at the sample mean instead of fitting it.
    #[arg(long)]
    pub fix_ex: bool,

    /// Iteration budget for the optimizer.
    #[arg(long = "max-iter", default_value_t = 1000)]
    pub max_iter: usize,

    /// Design frequencies (%) to convert to design values.
    #[arg(short = 'p', long, value_delimiter = ',', num_args = 1..)]
    pub prob: Vec<f64>,

    /// Design values to convert to design frequencies.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub value: Vec<f64>,

    /// Evaluation grid size for the theoretical curves.
    #[arg(long, default_value_t = 1000)]
    pub curve_points: usize,

    /// Print the full report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}
