//! Commit-vs-pay-as-you-go (ski rental) with predictions
//!
//! At every integer step `t = 1, 2, ...` the algorithm either keeps paying
//! `step_cost` or pays `commit_cost` once and stops paying. It commits at the
//! first step with `t >= threshold`, where the threshold blends the
//! break-even rule with the predicted duration:
//!
//! - low uncertainty (`uncertainty <= 0.2 * prediction`): follow the
//!   prediction, `threshold = prediction`
//! - high uncertainty: `threshold = (1 - trust) * break_even + trust * prediction`
//!
//! The threshold never depends on the step, so once the algorithm commits it
//! keeps committing for the rest of the session.

use super::{competitive_ratio, LearningAugmentedAlgorithm};
use crate::error::{LaaError, PredictionError, Result};
use crate::models::{Action, Decision, Prediction, ProblemParams, RecordedPrediction, TrustLevel};
use crate::predictor::DurationPredictor;
use serde::Serialize;
use tracing::debug;

/// Relative uncertainty above which the prediction is blended with the
/// break-even rule
pub const HIGH_UNCERTAINTY_RATIO: f64 = 0.2;

/// Which threshold rule applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyRegime {
    /// Prediction followed as-is
    Low,
    /// Prediction blended with the break-even rule by trust
    High,
}

impl UncertaintyRegime {
    pub fn classify(prediction: &Prediction) -> Self {
        if prediction.uncertainty > HIGH_UNCERTAINTY_RATIO * prediction.predicted_duration {
            UncertaintyRegime::High
        } else {
            UncertaintyRegime::Low
        }
    }
}

/// How a threshold was derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdBreakdown {
    /// Break-even step `commit_cost / step_cost`
    pub classical: f64,
    /// Threshold suggested by the prediction alone
    pub ml_threshold: f64,
    pub regime: UncertaintyRegime,
    pub threshold: f64,
    /// First integer step at which the algorithm commits (at least 1)
    pub commit_step: u64,
}

impl ThresholdBreakdown {
    fn derive(params: &ProblemParams, prediction: &Prediction, trust: TrustLevel) -> Self {
        let classical = params.break_even();
        let ml_threshold = prediction.predicted_duration;
        let regime = UncertaintyRegime::classify(prediction);
        let threshold = match regime {
            UncertaintyRegime::High => {
                (1.0 - trust.value()) * classical + trust.value() * ml_threshold
            }
            UncertaintyRegime::Low => ml_threshold,
        };

        Self {
            classical,
            ml_threshold,
            regime,
            threshold,
            commit_step: commit_step(threshold) as u64,
        }
    }

    /// Action for integer step `step`
    pub fn action_at(&self, step: u64) -> Action {
        if step as f64 >= self.threshold {
            Action::Commit
        } else {
            Action::PayAsYouGo
        }
    }
}

/// Decisions happen at integer steps, never before step 1
fn commit_step(threshold: f64) -> f64 {
    threshold.ceil().max(1.0)
}

fn validate_prediction(prediction: Prediction) -> Result<Prediction, PredictionError> {
    let Prediction {
        predicted_duration,
        uncertainty,
    } = prediction;
    if !predicted_duration.is_finite() || predicted_duration < 0.0 {
        return Err(PredictionError::InvalidPrediction {
            predicted_duration,
            uncertainty,
        });
    }
    if !uncertainty.is_finite() || uncertainty < 0.0 {
        return Err(PredictionError::InvalidPrediction {
            predicted_duration,
            uncertainty,
        });
    }
    Ok(prediction)
}

fn validate_duration(actual_duration: f64) -> Result<f64> {
    if actual_duration.is_finite() && actual_duration >= 0.0 {
        Ok(actual_duration)
    } else {
        Err(LaaError::InvalidOutcome(actual_duration))
    }
}

/// Offline optimum in hindsight: pay all the way or commit at the start
fn optimal_cost(params: &ProblemParams, actual_duration: f64) -> f64 {
    (actual_duration * params.step_cost()).min(params.commit_cost())
}

/// Ground truth for retrospective accounting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkiRentalOutcome {
    pub actual_duration: f64,
    /// Prediction the original decisions were based on
    pub recorded: RecordedPrediction,
}

impl SkiRentalOutcome {
    pub fn new(actual_duration: f64, recorded: RecordedPrediction) -> Self {
        Self {
            actual_duration,
            recorded,
        }
    }
}

/// Cost-only view of a ski-rental session.
///
/// Built from the prediction recorded when decisions were made; it never
/// consults a live predictor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkiRentalCostModel {
    params: ProblemParams,
    recorded: RecordedPrediction,
}

impl SkiRentalCostModel {
    pub fn new(params: ProblemParams, recorded: RecordedPrediction) -> Self {
        Self { params, recorded }
    }

    pub fn params(&self) -> &ProblemParams {
        &self.params
    }

    pub fn recorded(&self) -> &RecordedPrediction {
        &self.recorded
    }

    pub fn threshold(&self, trust: f64) -> Result<ThresholdBreakdown> {
        let trust = TrustLevel::new(trust)?;
        let prediction = validate_prediction(self.recorded.prediction)?;
        Ok(ThresholdBreakdown::derive(&self.params, &prediction, trust))
    }

    /// Closed-form cost of the online algorithm.
    ///
    /// Commits at `ceil(threshold)` (at least step 1) if the session lasts
    /// that long, paying for every earlier step; otherwise pays for the whole
    /// duration.
    pub fn algorithm_cost(&self, actual_duration: f64, trust: f64) -> Result<f64> {
        let breakdown = self.threshold(trust)?;
        let actual_duration = validate_duration(actual_duration)?;
        let commit_step = commit_step(breakdown.threshold);

        let cost = if actual_duration >= commit_step {
            (commit_step - 1.0) * self.params.step_cost() + self.params.commit_cost()
        } else {
            actual_duration * self.params.step_cost()
        };
        Ok(cost)
    }

    pub fn optimal_cost(&self, actual_duration: f64) -> Result<f64> {
        Ok(optimal_cost(&self.params, validate_duration(actual_duration)?))
    }

    pub fn competitive_ratio(&self, actual_duration: f64, trust: f64) -> Result<f64> {
        let algorithm = self.algorithm_cost(actual_duration, trust)?;
        let optimal = self.optimal_cost(actual_duration)?;
        Ok(competitive_ratio(algorithm, optimal))
    }
}

/// Learning-augmented ski-rental algorithm over a live predictor
#[derive(Debug, Clone)]
pub struct SkiRentalLaa<P> {
    predictor: P,
    params: ProblemParams,
}

impl<P: DurationPredictor> SkiRentalLaa<P> {
    pub fn new(predictor: P, params: ProblemParams) -> Self {
        Self { predictor, params }
    }

    /// Build from raw costs, validating them
    pub fn from_costs(predictor: P, commit_cost: f64, step_cost: f64) -> Result<Self> {
        Ok(Self::new(predictor, ProblemParams::new(commit_cost, step_cost)?))
    }

    pub fn params(&self) -> &ProblemParams {
        &self.params
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    fn live_prediction(&self) -> Result<Prediction> {
        let prediction = self.predictor.predict()?;
        Ok(validate_prediction(prediction)?)
    }

    /// Threshold derived from the live prediction
    pub fn threshold(&self, trust: f64) -> Result<ThresholdBreakdown> {
        let trust = TrustLevel::new(trust)?;
        let prediction = self.live_prediction()?;
        Ok(ThresholdBreakdown::derive(&self.params, &prediction, trust))
    }

    /// Snapshot the live prediction for later retrospective costing
    pub fn record_prediction(&self) -> Result<RecordedPrediction> {
        Ok(RecordedPrediction::new(self.live_prediction()?))
    }

    /// Cost-only model over a recorded prediction
    pub fn cost_model(&self, recorded: RecordedPrediction) -> SkiRentalCostModel {
        SkiRentalCostModel::new(self.params, recorded)
    }
}

impl<P: DurationPredictor> LearningAugmentedAlgorithm for SkiRentalLaa<P> {
    type State = u64;
    type Action = Action;
    type Outcome = SkiRentalOutcome;

    fn decide(&self, step: &u64, trust: f64) -> Result<Decision<Action>> {
        let trust = TrustLevel::new(trust)?;
        let prediction = self.live_prediction()?;
        let breakdown = ThresholdBreakdown::derive(&self.params, &prediction, trust);
        let action = breakdown.action_at(*step);
        let guarantee = trust.guarantee();

        debug!(
            step = *step,
            threshold = breakdown.threshold,
            regime = ?breakdown.regime,
            action = %action,
            guarantee,
            "Ski-rental decision"
        );

        Ok(Decision { action, guarantee })
    }

    fn compute_algorithm_cost(&self, outcome: &SkiRentalOutcome, trust: f64) -> Result<f64> {
        self.cost_model(outcome.recorded)
            .algorithm_cost(outcome.actual_duration, trust)
    }

    fn compute_optimal_cost(&self, outcome: &SkiRentalOutcome) -> Result<f64> {
        Ok(optimal_cost(
            &self.params,
            validate_duration(outcome.actual_duration)?,
        ))
    }
}
