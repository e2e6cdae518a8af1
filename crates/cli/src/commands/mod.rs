//! CLI commands and the arguments they share

pub mod decide;
pub mod evaluate;
pub mod simulate;

use anyhow::{bail, Context, Result};
use clap::Args;
use guardian_lib::{
    DecisionMetrics, DurationPredictor, FixedPredictor, HistoricalPredictor, HistoryConfig,
    LaaError, ProblemParams, SkiRentalLaa, StructuredLogger, UsageRecord,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::GuardianConfig;

/// Cost and trust arguments shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CostArgs {
    /// One-off cost of committing (overrides config)
    #[arg(long)]
    pub commit_cost: Option<f64>,

    /// Cost per step while paying as you go (overrides config)
    #[arg(long)]
    pub step_cost: Option<f64>,

    /// Trust in the prediction, in (0, 1] (overrides config)
    #[arg(long)]
    pub trust: Option<f64>,
}

impl CostArgs {
    /// Merge flags over configuration into validated parameters and a trust level
    pub fn resolve(&self, config: &GuardianConfig) -> Result<(ProblemParams, f64)> {
        let params = ProblemParams::new(
            self.commit_cost.unwrap_or(config.commit_cost),
            self.step_cost.unwrap_or(config.step_cost),
        )?;
        let trust = self.trust.unwrap_or(config.trust_level);

        debug!(
            commit_cost = params.commit_cost(),
            step_cost = params.step_cost(),
            trust,
            "Costs configured"
        );
        Ok((params, trust))
    }
}

/// Problem and prediction arguments for commands that consult a predictor
#[derive(Args, Debug, Clone, Default)]
pub struct ProblemArgs {
    #[command(flatten)]
    pub costs: CostArgs,

    /// JSON file of past sessions: [{"started_at": <unix secs>, "duration": <steps>}]
    #[arg(long, conflicts_with = "prediction")]
    pub history: Option<PathBuf>,

    /// Predicted duration from an external forecaster
    #[arg(long)]
    pub prediction: Option<f64>,

    /// Uncertainty of --prediction
    #[arg(long, default_value_t = 0.0, requires = "prediction")]
    pub uncertainty: f64,
}

/// Resolved inputs for one decision session
pub struct Session {
    pub laa: SkiRentalLaa<Box<dyn DurationPredictor>>,
    pub trust: f64,
}

impl ProblemArgs {
    /// Merge flags over configuration and build the algorithm
    pub fn into_session(self, config: &GuardianConfig) -> Result<Session> {
        let (params, trust) = self.costs.resolve(config)?;

        let predictor: Box<dyn DurationPredictor> = match (self.prediction, &self.history) {
            (Some(prediction), _) => Box::new(FixedPredictor::new(prediction, self.uncertainty)),
            (None, Some(path)) => {
                let records = load_history(path)?;
                let history_config = HistoryConfig {
                    window: config.history_window,
                    min_samples: config.min_history,
                };
                Box::new(HistoricalPredictor::with_config(&records, history_config))
            }
            (None, None) => bail!("Provide either --prediction or --history"),
        };

        Ok(Session {
            laa: SkiRentalLaa::new(predictor, params),
            trust,
        })
    }
}

/// Read past usage sessions from a JSON file
pub fn load_history(path: &Path) -> Result<Vec<UsageRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file {}", path.display()))
}

/// Record and log a failed operation, then hand it to the caller.
///
/// Predictor failures gain context so they read apart from bad inputs.
pub fn failure(
    err: LaaError,
    logger: &StructuredLogger,
    metrics: &DecisionMetrics,
) -> anyhow::Error {
    metrics.record_error(&err);
    logger.log_error(&err);
    if err.is_prediction_error() {
        anyhow::Error::new(err).context("Predictor could not supply a prediction")
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_lib::{LearningAugmentedAlgorithm, PredictionError};
    use std::io::Write;

    #[test]
    fn test_flags_override_config() {
        let args = ProblemArgs {
            costs: CostArgs {
                commit_cost: Some(100.0),
                trust: Some(0.5),
                ..Default::default()
            },
            prediction: Some(12.0),
            uncertainty: 5.0,
            ..Default::default()
        };
        let session = args.into_session(&GuardianConfig::default()).unwrap();
        assert_eq!(session.trust, 0.5);
        assert_eq!(session.laa.params().commit_cost(), 100.0);
        assert_eq!(session.laa.params().step_cost(), 10.0);
    }

    #[test]
    fn test_missing_prediction_source() {
        assert!(ProblemArgs::default()
            .into_session(&GuardianConfig::default())
            .is_err());
    }

    #[test]
    fn test_invalid_costs_rejected() {
        let args = ProblemArgs {
            costs: CostArgs {
                step_cost: Some(0.0),
                ..Default::default()
            },
            prediction: Some(12.0),
            ..Default::default()
        };
        assert!(args.into_session(&GuardianConfig::default()).is_err());
    }

    #[test]
    fn test_history_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"started_at": 1700000000, "duration": 10}},
                {{"started_at": 1700003600, "duration": 12}},
                {{"started_at": 1700007200, "duration": 14}}
            ]"#
        )
        .unwrap();

        let config = GuardianConfig {
            min_history: 3,
            ..Default::default()
        };
        let args = ProblemArgs {
            history: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let session = args.into_session(&config).unwrap();
        let prediction = session.laa.predictor().predict().unwrap();
        assert_eq!(prediction.predicted_duration, 12.0);
        assert!(session.laa.decide(&12, session.trust).is_ok());
    }

    #[test]
    fn test_unreadable_history() {
        assert!(load_history(Path::new("/nonexistent/history.json")).is_err());
    }

    #[test]
    fn test_failure_context() {
        let logger = StructuredLogger::new("test");
        let metrics = DecisionMetrics::new();

        let before = metrics.errors("prediction");
        let err = failure(
            PredictionError::InsufficientHistory { have: 1, need: 5 }.into(),
            &logger,
            &metrics,
        );
        assert_eq!(err.to_string(), "Predictor could not supply a prediction");
        assert!(format!("{:#}", err).contains("insufficient history"));
        assert!(metrics.errors("prediction") > before);

        let err = failure(LaaError::InvalidTrust(0.0), &logger, &metrics);
        assert_eq!(err.to_string(), "trust level 0 is outside (0, 1]");
    }
}
