//! Error types.
//!
//! The library reports [`EstimatorError`]; the `qcsf` binary folds everything into
//! [`AppError`], which carries the process exit code.
//!
//! Exit codes:
//! - `2`: configuration errors (bad ranges, resolutions, policies)
//! - `3`: usage-sequence errors (response without a pending stimulus)
//! - `4`: numerical-consistency errors (posterior collapsed)

use thiserror::Error;

/// Errors raised by the estimator core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// A `(min, max)` pair is non-finite, non-positive, inverted or outside its domain.
    #[error("Invalid {axis} range: min={min}, max={max} ({reason}).")]
    InvalidRange {
        axis: &'static str,
        min: f64,
        max: f64,
        reason: &'static str,
    },

    /// A grid dimension has too few points.
    #[error("Invalid {axis} resolution {got}: must be >= {min}.")]
    InvalidResolution {
        axis: &'static str,
        got: usize,
        min: usize,
    },

    /// A parameter dimension spans values the stimulus grid cannot test.
    #[error(
        "{parameter} range [{param_min:.3}, {param_max:.3}] (log10) lies outside \
         the probeable range [{probe_min:.3}, {probe_max:.3}]."
    )]
    UnprobeableParameterRange {
        parameter: &'static str,
        param_min: f64,
        param_max: f64,
        probe_min: f64,
        probe_max: f64,
    },

    /// The flattened grid overflows or exceeds the allocation limit.
    #[error("The {grid} grid {sizes:?} has more than {max} combinations.")]
    GridTooLarge {
        grid: &'static str,
        sizes: Vec<usize>,
        max: usize,
    },

    /// Sample count or top fraction of the stimulus selector is unusable.
    #[error("Invalid stimulus selection policy: {0}")]
    InvalidSelectionPolicy(String),

    /// Ground-truth parameter indices outside the parameter grid.
    #[error("True parameter index {index} for {parameter} is outside [0, {size}).")]
    InvalidTrueParameters {
        parameter: &'static str,
        index: usize,
        size: usize,
    },

    /// `mark_response` was called without a preceding `next()`.
    #[error("No pending stimulus: call next() before mark_response().")]
    NoPendingStimulus,

    /// An explicit stimulus index does not address the stimulus grid.
    #[error("Stimulus index {index} is outside the stimulus grid [0, {count}).")]
    StimulusIndexOutOfRange { index: usize, count: usize },

    /// The posterior no longer sums to a positive finite value.
    #[error("Posterior degenerated during normalisation (sum={sum}).")]
    DegeneratePosterior { sum: f64 },
}

impl EstimatorError {
    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            EstimatorError::InvalidRange { .. }
            | EstimatorError::InvalidResolution { .. }
            | EstimatorError::UnprobeableParameterRange { .. }
            | EstimatorError::GridTooLarge { .. }
            | EstimatorError::InvalidSelectionPolicy(_)
            | EstimatorError::InvalidTrueParameters { .. } => 2,
            EstimatorError::NoPendingStimulus | EstimatorError::StimulusIndexOutOfRange { .. } => 3,
            EstimatorError::DegeneratePosterior { .. } => 4,
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

impl From<EstimatorError> for AppError {
    fn from(err: EstimatorError) -> Self {
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
    fn exit_codes_follow_error_category() {
        let config = EstimatorError::InvalidResolution {
            axis: "contrast",
            got: 1,
            min: 2,
        };
        assert_eq!(config.exit_code(), 2);
        assert_eq!(EstimatorError::NoPendingStimulus.exit_code(), 3);
        assert_eq!(EstimatorError::DegeneratePosterior { sum: 0.0 }.exit_code(), 4);

        let app: AppError = EstimatorError::NoPendingStimulus.into();
        assert_eq!(app.exit_code(), 3);
        assert!(app.to_string().contains("next()"));
    }
}
