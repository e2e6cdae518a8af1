//! Core data models for the decision engine

use crate::error::{LaaError, Result};
use serde::{Deserialize, Serialize};

/// Default cost of committing, used by the reference simulation
pub const DEFAULT_COMMIT_COST: f64 = 500.0;

/// Default incremental cost per step
pub const DEFAULT_STEP_COST: f64 = 10.0;

/// Default trust placed in the predictor
pub const DEFAULT_TRUST_LEVEL: f64 = 0.8;

/// Cost parameters of a commit-vs-pay-as-you-go problem instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProblemParams {
    commit_cost: f64,
    step_cost: f64,
}

impl ProblemParams {
    /// Validate and build problem parameters.
    ///
    /// `step_cost` must be strictly positive, `commit_cost` non-negative.
    /// Both, and their ratio, must be finite.
    pub fn new(commit_cost: f64, step_cost: f64) -> Result<Self> {
        if !commit_cost.is_finite() || commit_cost < 0.0 {
            return Err(LaaError::Configuration {
                field: "commit_cost",
                value: commit_cost,
                reason: "must be finite and >= 0",
            });
        }
        if !step_cost.is_finite() || step_cost <= 0.0 {
            return Err(LaaError::Configuration {
                field: "step_cost",
                value: step_cost,
                reason: "must be finite and > 0",
            });
        }
        if !(commit_cost / step_cost).is_finite() {
            return Err(LaaError::Configuration {
                field: "commit_cost",
                value: commit_cost,
                reason: "break-even commit_cost / step_cost must be finite",
            });
        }
        Ok(Self {
            commit_cost,
            step_cost,
        })
    }

    pub fn commit_cost(&self) -> f64 {
        self.commit_cost
    }

    pub fn step_cost(&self) -> f64 {
        self.step_cost
    }

    /// Break-even step count `commit_cost / step_cost`
    pub fn break_even(&self) -> f64 {
        self.commit_cost / self.step_cost
    }
}

impl Default for ProblemParams {
    fn default() -> Self {
        Self {
            commit_cost: DEFAULT_COMMIT_COST,
            step_cost: DEFAULT_STEP_COST,
        }
    }
}

/// Caller confidence in the prediction, in (0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct TrustLevel(f64);

impl TrustLevel {
    pub fn new(value: f64) -> Result<Self> {
        // NaN fails both comparisons
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(LaaError::InvalidTrust(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Worst-case competitive ratio bound `(1 + trust) / trust`
    pub fn guarantee(&self) -> f64 {
        (1.0 + self.0) / self.0
    }
}

impl TryFrom<f64> for TrustLevel {
    type Error = LaaError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

/// Predictor output: expected duration and its uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_duration: f64,
    pub uncertainty: f64,
}

impl Prediction {
    pub fn new(predicted_duration: f64, uncertainty: f64) -> Self {
        Self {
            predicted_duration,
            uncertainty,
        }
    }
}

/// A prediction captured at decision time, replayed for retrospective costing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedPrediction {
    pub prediction: Prediction,
    /// Unix timestamp (seconds) when the prediction was captured
    pub recorded_at: i64,
}

impl RecordedPrediction {
    pub fn new(prediction: Prediction) -> Self {
        Self {
            prediction,
            recorded_at: chrono::Utc::now().timestamp(),
        }
    }
}

impl From<Prediction> for RecordedPrediction {
    fn from(prediction: Prediction) -> Self {
        Self::new(prediction)
    }
}

/// Commit-vs-pay-as-you-go action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    PayAsYouGo,
    Commit,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::PayAsYouGo => "pay_as_you_go",
            Action::Commit => "commit",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a single decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision<A> {
    pub action: A,
    /// Worst-case competitive ratio bound for the trust level used
    pub guarantee: f64,
}

/// One past usage session, used to build a duration prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unix timestamp (seconds) when the session started
    pub started_at: i64,
    /// Number of steps the session lasted
    pub duration: f64,
}
