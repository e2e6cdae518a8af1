//! Error types for the decision engine

use thiserror::Error;

/// Errors raised by predictor implementations.
///
/// These travel through the decision engine unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("insufficient history: have {have} records, need at least {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error("invalid observation at index {index}: {reason}")]
    InvalidObservation { index: usize, reason: String },

    #[error("predictor returned invalid output: duration {predicted_duration}, uncertainty {uncertainty}")]
    InvalidPrediction {
        predicted_duration: f64,
        uncertainty: f64,
    },
}

/// Errors raised by learning-augmented algorithms
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LaaError {
    /// Invalid problem parameters
    #[error("invalid problem parameter `{field}` = {value}: {reason}")]
    Configuration {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Trust level outside (0, 1]
    #[error("trust level {0} is outside (0, 1]")]
    InvalidTrust(f64),

    /// Actual duration negative or not finite
    #[error("actual duration {0} must be finite and >= 0")]
    InvalidOutcome(f64),

    /// Step-by-step replay would exceed the configured step budget
    #[error("replay of {steps} steps exceeds the limit of {limit}")]
    ReplayTooLong { steps: u64, limit: u64 },

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl LaaError {
    /// True for errors that originate in the predictor
    pub fn is_prediction_error(&self) -> bool {
        matches!(self, LaaError::Prediction(_))
    }
}

pub type Result<T, E = LaaError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_error_wraps_verbatim() {
        let source = PredictionError::InsufficientHistory { have: 2, need: 5 };
        let err: LaaError = source.clone().into();
        assert!(err.is_prediction_error());
        assert_eq!(err, LaaError::Prediction(source.clone()));
        assert_eq!(err.to_string(), source.to_string());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LaaError::InvalidTrust(0.0).to_string(),
            "trust level 0 is outside (0, 1]"
        );
        let err = LaaError::Configuration {
            field: "step_cost",
            value: -1.0,
            reason: "must be > 0",
        };
        assert!(err.to_string().contains("step_cost"));
        assert!(!err.is_prediction_error());
        assert_eq!(
            LaaError::ReplayTooLong { steps: 200, limit: 100 }.to_string(),
            "replay of 200 steps exceeds the limit of 100"
        );
    }
}
