//! Step-by-step replay of a ski-rental session
//!
//! Drives [`SkiRentalLaa::decide`] one integer step at a time against a known
//! duration, charging costs as they are incurred, and cross-checks the total
//! against the closed-form cost model.

use crate::error::{LaaError, Result};
use crate::laa::{
    competitive_ratio, LearningAugmentedAlgorithm, SkiRentalCostModel, SkiRentalLaa,
    ThresholdBreakdown,
};
use crate::models::{Action, RecordedPrediction, TrustLevel};
use crate::predictor::DurationPredictor;
use serde::Serialize;
use tracing::{debug, warn};

/// Relative tolerance when comparing online and closed-form costs
const COST_TOLERANCE: f64 = 1e-9;

/// Most steps a single replay will decide one at a time
pub const DEFAULT_MAX_REPLAY_STEPS: u64 = 100_000;

/// One decision in the replay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: u64,
    pub action: Action,
    /// Total paid after this step's action
    pub cumulative_cost: f64,
}

/// Result of replaying a session
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub actual_duration: f64,
    pub trust_level: f64,
    pub recorded: RecordedPrediction,
    pub threshold: ThresholdBreakdown,
    pub steps: Vec<StepRecord>,
    /// Step at which the algorithm committed, if it did
    pub commit_step: Option<u64>,
    /// Cost accumulated by the replay
    pub online_cost: f64,
    /// Cost from the closed-form model
    pub algorithm_cost: f64,
    pub optimal_cost: f64,
    pub competitive_ratio: f64,
    pub guarantee: f64,
    pub within_guarantee: bool,
}

impl SimulationReport {
    pub fn committed(&self) -> bool {
        self.commit_step.is_some()
    }

    /// Online replay and closed form agree
    pub fn is_consistent(&self) -> bool {
        let scale = self.algorithm_cost.abs().max(1.0);
        (self.online_cost - self.algorithm_cost).abs() <= COST_TOLERANCE * scale
    }
}

/// Replay a session of `actual_duration` steps.
///
/// Steps `1..=floor(actual_duration)` are decided online. A commit pays
/// `commit_cost` and ends the session; otherwise each step pays `step_cost`
/// and any fractional remainder is charged pro rata.
///
/// At most [`DEFAULT_MAX_REPLAY_STEPS`] steps are replayed; see
/// [`simulate_with_limit`].
pub fn simulate<P: DurationPredictor>(
    laa: &SkiRentalLaa<P>,
    actual_duration: f64,
    trust: f64,
) -> Result<SimulationReport> {
    simulate_with_limit(laa, actual_duration, trust, DEFAULT_MAX_REPLAY_STEPS)
}

/// Replay a session, refusing with [`LaaError::ReplayTooLong`] when more
/// than `max_steps` steps would have to be decided.
///
/// The replay stops at the commit step, so a long session with an early
/// commit stays cheap.
pub fn simulate_with_limit<P: DurationPredictor>(
    laa: &SkiRentalLaa<P>,
    actual_duration: f64,
    trust: f64,
    max_steps: u64,
) -> Result<SimulationReport> {
    let trust_level = TrustLevel::new(trust)?;
    if !actual_duration.is_finite() || actual_duration < 0.0 {
        return Err(LaaError::InvalidOutcome(actual_duration));
    }

    let recorded = laa.record_prediction()?;
    let threshold = laa.threshold(trust)?;
    let params = *laa.params();

    // Saturates for durations beyond u64::MAX
    let whole_steps = actual_duration.floor() as u64;
    let replayed = whole_steps.min(threshold.commit_step);
    if replayed > max_steps {
        warn!(
            steps = replayed,
            limit = max_steps,
            "Replay exceeds step budget"
        );
        return Err(LaaError::ReplayTooLong {
            steps: replayed,
            limit: max_steps,
        });
    }

    let mut steps = Vec::with_capacity(replayed as usize);
    let mut online_cost = 0.0;
    let mut commit_step = None;

    for step in 1..=replayed {
        let decision = laa.decide(&step, trust)?;
        match decision.action {
            Action::Commit => online_cost += params.commit_cost(),
            Action::PayAsYouGo => online_cost += params.step_cost(),
        }
        steps.push(StepRecord {
            step,
            action: decision.action,
            cumulative_cost: online_cost,
        });
        if decision.action == Action::Commit {
            commit_step = Some(step);
            break;
        }
    }

    if commit_step.is_none() {
        online_cost += (actual_duration - whole_steps as f64) * params.step_cost();
    }

    let model = laa.cost_model(recorded);
    let algorithm_cost = model.algorithm_cost(actual_duration, trust)?;
    let optimal_cost = model.optimal_cost(actual_duration)?;
    let ratio = competitive_ratio(algorithm_cost, optimal_cost);
    let guarantee = trust_level.guarantee();

    let report = SimulationReport {
        actual_duration,
        trust_level: trust_level.value(),
        recorded,
        threshold,
        steps,
        commit_step,
        online_cost,
        algorithm_cost,
        optimal_cost,
        competitive_ratio: ratio,
        guarantee,
        within_guarantee: ratio <= guarantee,
    };

    if !report.is_consistent() {
        warn!(
            online_cost = report.online_cost,
            algorithm_cost = report.algorithm_cost,
            "Replay cost disagrees with closed form"
        );
    }
    if !report.within_guarantee {
        warn!(
            competitive_ratio = ratio,
            guarantee,
            "Realised competitive ratio exceeds guarantee"
        );
    }
    debug!(
        actual_duration,
        commit_step = ?report.commit_step,
        algorithm_cost,
        optimal_cost,
        "Simulation complete"
    );

    Ok(report)
}

/// Retrospective check of a finished session.
///
/// Costs come from the prediction recorded in `model`; no predictor is
/// consulted.
pub fn evaluate(
    model: &SkiRentalCostModel,
    actual_duration: f64,
    trust: f64,
) -> Result<Evaluation> {
    let threshold = model.threshold(trust)?;
    let algorithm_cost = model.algorithm_cost(actual_duration, trust)?;
    let optimal_cost = model.optimal_cost(actual_duration)?;
    let guarantee = TrustLevel::new(trust)?.guarantee();
    let ratio = competitive_ratio(algorithm_cost, optimal_cost);

    if ratio.is_infinite() {
        warn!(algorithm_cost, "Optimal cost is zero but the algorithm paid");
    }

    Ok(Evaluation {
        actual_duration,
        threshold,
        algorithm_cost,
        optimal_cost,
        competitive_ratio: ratio,
        guarantee,
        within_guarantee: ratio <= guarantee,
    })
}

/// Costs of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub actual_duration: f64,
    pub threshold: ThresholdBreakdown,
    pub algorithm_cost: f64,
    pub optimal_cost: f64,
    pub competitive_ratio: f64,
    pub guarantee: f64,
    pub within_guarantee: bool,
}
