//! Retrospective cost evaluation command

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use guardian_lib::{
    evaluate, DecisionMetrics, Prediction, RecordedPrediction, SkiRentalCostModel,
    StructuredLogger,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{failure, CostArgs};
use crate::config::GuardianConfig;
use crate::output::{
    color_ratio, format_cost, format_ratio, format_timestamp, print_json, print_success,
    print_warning, OutputFormat,
};

/// Arguments naming the prediction a finished session was decided with.
///
/// A live predictor is never consulted here: history may have moved on
/// since the decisions were made.
#[derive(Args, Debug, Clone, Default)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub costs: CostArgs,

    /// Output of `decide --format json`, or a bare recorded prediction
    #[arg(long, conflicts_with = "prediction")]
    pub recorded: Option<PathBuf>,

    /// Predicted duration the session was decided with
    #[arg(long)]
    pub prediction: Option<f64>,

    /// Uncertainty of --prediction
    #[arg(long, default_value_t = 0.0, requires = "prediction")]
    pub uncertainty: f64,
}

impl EvaluateArgs {
    /// Merge flags over configuration and build the cost model
    pub fn into_model(self, config: &GuardianConfig) -> Result<(SkiRentalCostModel, f64)> {
        let (params, trust) = self.costs.resolve(config)?;
        let recorded = match (&self.recorded, self.prediction) {
            (Some(path), _) => load_recorded(path)?,
            (None, Some(prediction)) => {
                RecordedPrediction::new(Prediction::new(prediction, self.uncertainty))
            }
            (None, None) => bail!("Provide either --recorded or --prediction"),
        };
        debug!(
            predicted_duration = recorded.prediction.predicted_duration,
            recorded_at = recorded.recorded_at,
            "Loaded recorded prediction"
        );
        Ok((SkiRentalCostModel::new(params, recorded), trust))
    }
}

/// Accepted layouts of a `--recorded` file
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordedFile {
    Decision { recorded: RecordedPrediction },
    Bare(RecordedPrediction),
}

/// Read a recorded prediction from a decision or bare JSON file
pub fn load_recorded(path: &Path) -> Result<RecordedPrediction> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recorded prediction {}", path.display()))?;
    let file: RecordedFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse recorded prediction {}", path.display()))?;
    Ok(match file {
        RecordedFile::Decision { recorded } | RecordedFile::Bare(recorded) => recorded,
    })
}

#[derive(Debug, Serialize)]
struct EvaluateOutput {
    recorded: RecordedPrediction,
    #[serde(flatten)]
    evaluation: guardian_lib::Evaluation,
}

/// Cost a finished session against the prediction it was decided with
pub fn run(
    model: &SkiRentalCostModel,
    trust: f64,
    actual_duration: f64,
    logger: &StructuredLogger,
    metrics: &DecisionMetrics,
    format: OutputFormat,
) -> Result<()> {
    let evaluation =
        evaluate(model, actual_duration, trust).map_err(|err| failure(err, logger, metrics))?;
    let output = EvaluateOutput {
        recorded: *model.recorded(),
        evaluation,
    };
    metrics.record_evaluation(&output.evaluation);
    logger.log_evaluation(&output.evaluation);

    match format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Table => {
            let eval = &output.evaluation;
            println!("{}", "Evaluation".bold());
            println!("{}", "=".repeat(50));
            println!(
                "Recorded prediction:    {:.2} (± {:.2})",
                output.recorded.prediction.predicted_duration,
                output.recorded.prediction.uncertainty
            );
            println!(
                "Recorded at:            {}",
                format_timestamp(output.recorded.recorded_at).dimmed()
            );
            println!(
                "Threshold:              {:.2} (commit at step {})",
                eval.threshold.threshold, eval.threshold.commit_step
            );
            println!("Actual duration:        {:.2}", eval.actual_duration);
            println!();
            println!("Algorithm cost:         {}", format_cost(eval.algorithm_cost));
            println!("Optimal cost:           {}", format_cost(eval.optimal_cost));
            println!(
                "Competitive ratio:      {}",
                color_ratio(eval.competitive_ratio, eval.guarantee)
            );
            println!("Guarantee:              {}", format_ratio(eval.guarantee));
            println!();

            if eval.within_guarantee {
                print_success("Within worst-case guarantee");
            } else {
                print_warning("Exceeded worst-case guarantee");
            }
        }
    }

    Ok(())
}
