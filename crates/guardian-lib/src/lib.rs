//! Learning-augmented decision engine
//!
//! This crate provides:
//! - The [`LearningAugmentedAlgorithm`] abstraction for online decisions
//!   guided by untrusted predictions
//! - The commit-vs-pay-as-you-go (ski rental) variant with threshold
//!   blending and retrospective cost accounting
//! - Duration predictors over historical usage
//! - A step-by-step session simulator
//! - Prometheus metrics and structured logging

pub mod error;
pub mod laa;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod simulation;

pub use error::{LaaError, PredictionError};
pub use laa::{
    LearningAugmentedAlgorithm, SkiRentalCostModel, SkiRentalLaa, SkiRentalOutcome,
    ThresholdBreakdown, UncertaintyRegime,
};
pub use models::*;
pub use observability::{DecisionMetrics, StructuredLogger};
pub use predictor::{DurationPredictor, FixedPredictor, HistoricalPredictor, HistoryConfig};
pub use simulation::{
    evaluate, simulate, simulate_with_limit, Evaluation, SimulationReport, StepRecord,
    DEFAULT_MAX_REPLAY_STEPS,
};
