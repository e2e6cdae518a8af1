//! Observability for the decision engine
//!
//! Provides:
//! - Prometheus metrics (decisions by action, errors by kind, realised
//!   competitive ratios, current guarantee)
//! - Structured logging of session events with tracing

use crate::error::LaaError;
use crate::models::{Action, Decision, Prediction};
use crate::simulation::{Evaluation, SimulationReport};
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec, Encoder,
    Gauge, Histogram, IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for competitive ratios (1.0 is optimal)
const RATIO_BUCKETS: &[f64] = &[1.0, 1.1, 1.25, 1.5, 1.75, 2.0, 2.5, 3.0, 4.0, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<DecisionMetricsInner> = OnceLock::new();

struct DecisionMetricsInner {
    decisions: IntCounterVec,
    decision_errors: IntCounterVec,
    competitive_ratio: Histogram,
    unbounded_ratios: IntCounter,
    guarantee_breaches: IntCounter,
    current_guarantee: Gauge,
    predicted_duration: Gauge,
    prediction_uncertainty: Gauge,
}

impl DecisionMetricsInner {
    fn new() -> Self {
        Self {
            decisions: register_int_counter_vec!(
                "guardian_decisions_total",
                "Decisions taken, by action",
                &["action"]
            )
            .expect("Failed to register decisions_total"),

            decision_errors: register_int_counter_vec!(
                "guardian_decision_errors_total",
                "Failed operations, by error kind",
                &["kind"]
            )
            .expect("Failed to register decision_errors_total"),

            competitive_ratio: register_histogram!(
                "guardian_competitive_ratio",
                "Realised competitive ratio of evaluated sessions",
                RATIO_BUCKETS.to_vec()
            )
            .expect("Failed to register competitive_ratio"),

            unbounded_ratios: register_int_counter!(
                "guardian_unbounded_ratio_total",
                "Sessions where the optimum was free but the algorithm paid"
            )
            .expect("Failed to register unbounded_ratio_total"),

            guarantee_breaches: register_int_counter!(
                "guardian_guarantee_breaches_total",
                "Sessions whose competitive ratio exceeded the guarantee"
            )
            .expect("Failed to register guarantee_breaches_total"),

            current_guarantee: register_gauge!(
                "guardian_guarantee",
                "Worst-case guarantee of the most recent decision"
            )
            .expect("Failed to register guarantee"),

            predicted_duration: register_gauge!(
                "guardian_predicted_duration",
                "Most recent predicted duration"
            )
            .expect("Failed to register predicted_duration"),

            prediction_uncertainty: register_gauge!(
                "guardian_prediction_uncertainty",
                "Most recent prediction uncertainty"
            )
            .expect("Failed to register prediction_uncertainty"),
        }
    }
}

/// Label for an error kind
fn error_kind(err: &LaaError) -> &'static str {
    match err {
        LaaError::Configuration { .. } => "configuration",
        LaaError::InvalidTrust(_) => "trust",
        LaaError::InvalidOutcome(_) => "outcome",
        LaaError::ReplayTooLong { .. } => "replay",
        LaaError::Prediction(_) => "prediction",
    }
}

/// Decision metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct DecisionMetrics {
    _private: (),
}

impl Default for DecisionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(DecisionMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &DecisionMetricsInner {
        GLOBAL_METRICS.get_or_init(DecisionMetricsInner::new)
    }

    pub fn record_decision(&self, decision: &Decision<Action>) {
        self.inner()
            .decisions
            .with_label_values(&[decision.action.as_str()])
            .inc();
        self.inner().current_guarantee.set(decision.guarantee);
    }

    pub fn record_prediction(&self, prediction: &Prediction) {
        self.inner()
            .predicted_duration
            .set(prediction.predicted_duration);
        self.inner()
            .prediction_uncertainty
            .set(prediction.uncertainty);
    }

    /// Record a realised competitive ratio against its guarantee
    pub fn record_ratio(&self, ratio: f64, guarantee: f64) {
        if ratio.is_infinite() {
            self.inner().unbounded_ratios.inc();
        } else {
            self.inner().competitive_ratio.observe(ratio);
        }
        if ratio > guarantee {
            self.inner().guarantee_breaches.inc();
        }
    }

    pub fn record_report(&self, report: &SimulationReport) {
        self.record_prediction(&report.recorded.prediction);
        for step in &report.steps {
            self.record_decision(&Decision {
                action: step.action,
                guarantee: report.guarantee,
            });
        }
        self.record_ratio(report.competitive_ratio, report.guarantee);
    }

    pub fn record_evaluation(&self, evaluation: &Evaluation) {
        self.record_ratio(evaluation.competitive_ratio, evaluation.guarantee);
    }

    pub fn record_error(&self, err: &LaaError) {
        self.inner()
            .decision_errors
            .with_label_values(&[error_kind(err)])
            .inc();
    }

    pub fn decisions(&self, action: Action) -> u64 {
        self.inner()
            .decisions
            .with_label_values(&[action.as_str()])
            .get()
    }

    pub fn errors(&self, kind: &str) -> u64 {
        self.inner().decision_errors.with_label_values(&[kind]).get()
    }

    pub fn guarantee_breaches(&self) -> u64 {
        self.inner().guarantee_breaches.get()
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Structured logger for decision session events
#[derive(Clone)]
pub struct StructuredLogger {
    session: String,
}

impl StructuredLogger {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
        }
    }

    pub fn log_startup(&self, version: &str, commit_cost: f64, step_cost: f64) {
        info!(
            event = "session_started",
            session = %self.session,
            version = %version,
            commit_cost = commit_cost,
            step_cost = step_cost,
            "Decision session started"
        );
    }

    pub fn log_decision(&self, step: u64, trust: f64, decision: &Decision<Action>) {
        info!(
            event = "decision",
            session = %self.session,
            step = step,
            trust = trust,
            action = %decision.action,
            guarantee = decision.guarantee,
            "Decision taken"
        );
    }

    pub fn log_evaluation(&self, evaluation: &Evaluation) {
        if evaluation.within_guarantee {
            info!(
                event = "session_evaluated",
                session = %self.session,
                actual_duration = evaluation.actual_duration,
                algorithm_cost = evaluation.algorithm_cost,
                optimal_cost = evaluation.optimal_cost,
                competitive_ratio = evaluation.competitive_ratio,
                guarantee = evaluation.guarantee,
                "Session within guarantee"
            );
        } else {
            warn!(
                event = "session_evaluated",
                session = %self.session,
                actual_duration = evaluation.actual_duration,
                algorithm_cost = evaluation.algorithm_cost,
                optimal_cost = evaluation.optimal_cost,
                competitive_ratio = evaluation.competitive_ratio,
                guarantee = evaluation.guarantee,
                "Session exceeded guarantee"
            );
        }
    }

    pub fn log_error(&self, err: &LaaError) {
        warn!(
            event = "decision_failed",
            session = %self.session,
            kind = error_kind(err),
            error = %err,
            "Decision failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_metrics_counts() {
        let metrics = DecisionMetrics::new();
        let before = metrics.decisions(Action::Commit);
        metrics.record_decision(&Decision {
            action: Action::Commit,
            guarantee: 2.0,
        });
        assert!(metrics.decisions(Action::Commit) > before);
    }

    #[test]
    fn test_error_kinds() {
        let metrics = DecisionMetrics::new();
        let before = metrics.errors("trust");
        metrics.record_error(&LaaError::InvalidTrust(0.0));
        assert!(metrics.errors("trust") > before);
        assert_eq!(error_kind(&LaaError::InvalidOutcome(-1.0)), "outcome");
        assert_eq!(
            error_kind(&LaaError::ReplayTooLong { steps: 10, limit: 5 }),
            "replay"
        );
    }

    #[test]
    fn test_ratio_breach_counted() {
        let metrics = DecisionMetrics::new();
        let before = metrics.guarantee_breaches();
        metrics.record_ratio(3.0, 2.0);
        metrics.record_ratio(f64::INFINITY, 2.0);
        assert!(metrics.guarantee_breaches() >= before + 2);
    }

    #[test]
    fn test_render_contains_metrics() {
        let metrics = DecisionMetrics::new();
        metrics.record_ratio(1.5, 2.0);
        let text = metrics.render().unwrap();
        assert!(text.contains("guardian_competitive_ratio"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("session-1");
        assert_eq!(logger.session, "session-1");
    }
}
