//! Prediction from past usage sessions
//!
//! Summarises the most recent sessions into a point estimate (sample mean)
//! and an uncertainty (sample standard deviation). The summary is computed
//! once at construction, so every `predict` call on an instance agrees.

use super::DurationPredictor;
use crate::error::PredictionError;
use crate::models::{Prediction, UsageRecord};
use tracing::debug;

/// Default number of most recent sessions considered
pub const DEFAULT_HISTORY_WINDOW: usize = 50;

/// Minimum number of sessions required for a prediction
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// Configuration for [`HistoricalPredictor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Number of most recent sessions to summarise
    pub window: usize,
    /// Sessions required before a prediction is produced
    pub min_samples: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_HISTORY_WINDOW,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Predicts session duration from historical usage records
#[derive(Debug, Clone)]
pub struct HistoricalPredictor {
    outcome: Result<Prediction, PredictionError>,
    samples_used: usize,
}

impl HistoricalPredictor {
    pub fn new(records: &[UsageRecord]) -> Self {
        Self::with_config(records, HistoryConfig::default())
    }

    pub fn with_config(records: &[UsageRecord], config: HistoryConfig) -> Self {
        let (outcome, samples_used) = match Self::summarise(records, config) {
            Ok((prediction, used)) => (Ok(prediction), used),
            Err(e) => (Err(e), 0),
        };

        match &outcome {
            Ok(p) => debug!(
                predicted_duration = p.predicted_duration,
                uncertainty = p.uncertainty,
                samples = samples_used,
                "Built prediction from history"
            ),
            Err(e) => debug!(error = %e, "History cannot support a prediction"),
        }

        Self {
            outcome,
            samples_used,
        }
    }

    fn summarise(
        records: &[UsageRecord],
        config: HistoryConfig,
    ) -> Result<(Prediction, usize), PredictionError> {
        for (index, record) in records.iter().enumerate() {
            if !record.duration.is_finite() {
                return Err(PredictionError::InvalidObservation {
                    index,
                    reason: "duration is not finite".to_string(),
                });
            }
            if record.duration < 0.0 {
                return Err(PredictionError::InvalidObservation {
                    index,
                    reason: format!("duration {} is negative", record.duration),
                });
            }
        }

        let need = config.min_samples.max(1);
        if records.len() < need {
            return Err(PredictionError::InsufficientHistory {
                have: records.len(),
                need,
            });
        }

        let mut ordered: Vec<&UsageRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.started_at);
        let window = config.window.max(need);
        let recent: Vec<f64> = ordered
            .iter()
            .rev()
            .take(window)
            .rev()
            .map(|r| r.duration)
            .collect();

        let prediction = Prediction::new(mean(&recent), std_dev(&recent));
        Ok((prediction, recent.len()))
    }

    /// Number of sessions that contributed to the prediction
    pub fn samples_used(&self) -> usize {
        self.samples_used
    }
}

impl DurationPredictor for HistoricalPredictor {
    fn predict(&self) -> Result<Prediction, PredictionError> {
        self.outcome.clone()
    }
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation, 0 for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}
