//! Learning-augmented online algorithms
//!
//! A learning-augmented algorithm (LAA) consumes an untrusted prediction to
//! improve typical-case cost while keeping a worst-case bound that depends
//! on the caller's trust level. Each problem family implements
//! [`LearningAugmentedAlgorithm`] with its own state, action and cost model.

mod ski_rental;

pub use ski_rental::{
    SkiRentalCostModel, SkiRentalLaa, SkiRentalOutcome, ThresholdBreakdown, UncertaintyRegime,
    HIGH_UNCERTAINTY_RATIO,
};

use crate::error::Result;
use crate::models::Decision;

/// Trait for prediction-augmented online decision algorithms
pub trait LearningAugmentedAlgorithm {
    /// Online state a decision is taken in
    type State;
    /// Action chosen at each decision point
    type Action;
    /// Ground truth revealed after the fact
    type Outcome;

    /// Choose an action for `state`.
    ///
    /// Fails with [`crate::LaaError::InvalidTrust`] when `trust` is outside
    /// (0, 1] and propagates predictor errors unchanged.
    fn decide(&self, state: &Self::State, trust: f64) -> Result<Decision<Self::Action>>;

    /// Cost the online algorithm paid for `outcome`
    fn compute_algorithm_cost(&self, outcome: &Self::Outcome, trust: f64) -> Result<f64>;

    /// Cost of the best offline decision for `outcome`
    fn compute_optimal_cost(&self, outcome: &Self::Outcome) -> Result<f64>;

    /// Realised competitive ratio `algorithm_cost / optimal_cost`.
    ///
    /// When the optimal cost is zero the ratio is `1.0` if the algorithm
    /// also paid nothing and `f64::INFINITY` otherwise.
    fn compute_competitive_ratio(&self, outcome: &Self::Outcome, trust: f64) -> Result<f64> {
        let algorithm_cost = self.compute_algorithm_cost(outcome, trust)?;
        let optimal_cost = self.compute_optimal_cost(outcome)?;
        Ok(competitive_ratio(algorithm_cost, optimal_cost))
    }
}

/// Ratio of online to offline cost with the zero-optimum convention
pub fn competitive_ratio(algorithm_cost: f64, optimal_cost: f64) -> f64 {
    if optimal_cost == 0.0 {
        if algorithm_cost > 0.0 {
            f64::INFINITY
        } else {
            1.0
        }
    } else {
        algorithm_cost / optimal_cost
    }
}
