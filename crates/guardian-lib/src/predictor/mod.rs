//! Duration prediction capability
//!
//! The decision engine consumes predictions only through the
//! [`DurationPredictor`] trait. Implementations must return the same output
//! on every call for the lifetime of one instance.

mod fixed;
mod history;

pub use fixed::FixedPredictor;
pub use history::{
    mean, std_dev, HistoricalPredictor, HistoryConfig, DEFAULT_HISTORY_WINDOW,
    DEFAULT_MIN_SAMPLES,
};

use crate::error::PredictionError;
use crate::models::Prediction;

/// Trait for prediction implementations
pub trait DurationPredictor {
    /// Predicted usage duration and its uncertainty
    fn predict(&self) -> Result<Prediction, PredictionError>;
}

impl<P: DurationPredictor + ?Sized> DurationPredictor for &P {
    fn predict(&self) -> Result<Prediction, PredictionError> {
        (**self).predict()
    }
}

impl<P: DurationPredictor + ?Sized> DurationPredictor for Box<P> {
    fn predict(&self) -> Result<Prediction, PredictionError> {
        (**self).predict()
    }
}
