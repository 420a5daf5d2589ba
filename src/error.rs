//! Error types.
//!
//! - `FreqError` is returned by the estimation engine (statistics, positioning,
//!   fitting, quantile inversion).
//! - `AppError` is what the binary reports: a message plus a process exit code.

use crate::domain::{SkewEstimator, Stage};

/// Failure of an estimation-engine operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FreqError {
    /// The sample is too small for the selected skew estimator.
    #[error("insufficient sample size: the {estimator} skew estimator needs at least {min} observations, got {n}")]
    InsufficientSample {
        n: usize,
        min: usize,
        estimator: SkewEstimator,
    },

    /// An observation is not a finite positive flow.
    #[error("invalid observation at index {index}: {value} (flows must be finite and positive)")]
    InvalidObservation { index: usize, value: f64 },

    /// Every observation has the same value, so `Cv = 0`.
    #[error("sample has no variation (every observation equals {value})")]
    ConstantSample { value: f64 },

    /// An argument lies outside the domain of a quantile operation.
    #[error("domain error: {argument} = {value}: {reason}")]
    Domain {
        argument: &'static str,
        value: f64,
        reason: String,
    },

    /// The nonlinear least-squares fit failed.
    #[error("fitting did not converge ({mode}): {reason}")]
    FittingConvergence { mode: &'static str, reason: String },

    /// An operation was invoked before the stage it depends on.
    #[error("`{operation}` requires stage {required}, but the estimator is at stage {actual}")]
    Precondition {
        operation: &'static str,
        required: Stage,
        actual: Stage,
    },

    /// statrs rejected the distribution parameters.
    #[error("distribution construction failed: {message}")]
    Distribution { message: String },
}

impl FreqError {
    pub(crate) fn domain(argument: &'static str, value: f64, reason: impl Into<String>) -> Self {
        FreqError::Domain {
            argument,
            value,
            reason: reason.into(),
        }
    }

    pub(crate) fn convergence(mode: &'static str, reason: impl Into<String>) -> Self {
        FreqError::FittingConvergence {
            mode,
            reason: reason.into(),
        }
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FreqError::Domain { .. } => 2,
            FreqError::InsufficientSample { .. }
            | FreqError::InvalidObservation { .. }
            | FreqError::ConstantSample { .. } => 3,
            FreqError::FittingConvergence { .. }
            | FreqError::Precondition { .. }
            | FreqError::Distribution { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FreqError> for AppError {
    fn from(err: FreqError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_sample_message() {
        let e = FreqError::InsufficientSample {
            n: 1,
            min: 4,
            estimator: SkewEstimator::Moment,
        };
        assert_eq!(
            e.to_string(),
            "insufficient sample size: the moment skew estimator needs at least 4 observations, got 1"
        );
    }

    #[test]
    fn precondition_message_names_stages() {
        let e = FreqError::Precondition {
            operation: "prob_to_value",
            required: Stage::OptimallyFitted,
            actual: Stage::Raw,
        };
        assert_eq!(
            e.to_string(),
            "`prob_to_value` requires stage optimally-fitted, but the estimator is at stage raw"
        );
    }

    #[test]
    fn app_error_keeps_exit_code() {
        let app: AppError = FreqError::domain("prob", 0.0, "must lie in (0, 100)").into();
        assert_eq!(app.exit_code(), 2);
        assert_eq!(app.to_string(), "domain error: prob = 0: must lie in (0, 100)");

        let app: AppError = FreqError::convergence("ex-cv-cs", "singular Jacobian").into();
        assert_eq!(app.exit_code(), 4);
    }

    #[test]
    fn freq_error_is_std_error_send_sync() {
        fn assert_impl<T: std::error::Error + Send + Sync>() {}
        assert_impl::<FreqError>();
    }
}
