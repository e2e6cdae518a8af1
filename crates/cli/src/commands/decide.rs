//! Single-step decision command

use anyhow::Result;
use colored::Colorize;
use guardian_lib::{
    Action, DecisionMetrics, LearningAugmentedAlgorithm, Prediction, RecordedPrediction,
    StructuredLogger, ThresholdBreakdown,
};
use serde::Serialize;

use super::{failure, Session};
use crate::output::{color_action, format_ratio, print_info, print_json, OutputFormat};

/// Decision plus the prediction it was based on
#[derive(Debug, Serialize)]
struct DecideOutput {
    step: u64,
    action: Action,
    guarantee: f64,
    prediction: f64,
    uncertainty: f64,
    threshold: ThresholdBreakdown,
    /// Keep for `evaluate --recorded`
    recorded: RecordedPrediction,
}

/// Decide whether to commit at `step`
pub fn run(
    session: &Session,
    step: u64,
    logger: &StructuredLogger,
    metrics: &DecisionMetrics,
    format: OutputFormat,
) -> Result<()> {
    let laa = &session.laa;
    let result = laa.decide(&step, session.trust).and_then(|decision| {
        let recorded = laa.record_prediction()?;
        let threshold = laa.threshold(session.trust)?;
        Ok((decision, recorded, threshold))
    });

    let (decision, recorded, threshold) = result.map_err(|err| failure(err, logger, metrics))?;
    let prediction = recorded.prediction;

    metrics.record_decision(&decision);
    metrics.record_prediction(&prediction);
    logger.log_decision(step, session.trust, &decision);

    let Prediction {
        predicted_duration,
        uncertainty,
    } = prediction;
    let output = DecideOutput {
        step,
        action: decision.action,
        guarantee: decision.guarantee,
        prediction: predicted_duration,
        uncertainty,
        threshold,
        recorded,
    };

    match format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Table => {
            println!("{}", "Decision".bold());
            println!("{}", "=".repeat(50));
            println!("Step:                   {}", output.step);
            println!("Action:                 {}", color_action(output.action));
            println!(
                "Guarantee:              {}",
                format_ratio(output.guarantee).cyan()
            );
            println!();
            println!("{}", "Prediction".bold());
            println!("{}", "-".repeat(50));
            println!(
                "Predicted duration:     {:.2} (± {:.2})",
                output.prediction, output.uncertainty
            );
            println!(
                "Regime:                 {:?} uncertainty",
                output.threshold.regime
            );
            println!("Break-even:             {:.2}", output.threshold.classical);
            println!("Threshold:              {:.2}", output.threshold.threshold);
            println!("Commits at step:        {}", output.threshold.commit_step);

            if output.action == Action::PayAsYouGo {
                println!();
                print_info(&format!(
                    "Keep paying; commit becomes due at step {}",
                    output.threshold.commit_step
                ));
            }
        }
    }

    Ok(())
}
