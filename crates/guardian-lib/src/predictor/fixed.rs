//! Constant predictor

use super::DurationPredictor;
use crate::error::PredictionError;
use crate::models::Prediction;

/// Predictor that always returns the same prediction.
///
/// Used when the caller already holds a forecast from an external model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPredictor {
    prediction: Prediction,
}

impl FixedPredictor {
    pub fn new(predicted_duration: f64, uncertainty: f64) -> Self {
        Self {
            prediction: Prediction::new(predicted_duration, uncertainty),
        }
    }
}

impl From<Prediction> for FixedPredictor {
    fn from(prediction: Prediction) -> Self {
        Self { prediction }
    }
}

impl DurationPredictor for FixedPredictor {
    fn predict(&self) -> Result<Prediction, PredictionError> {
        Ok(self.prediction)
    }
}
