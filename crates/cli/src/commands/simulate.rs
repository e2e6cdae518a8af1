//! Full session replay command

use anyhow::Result;
use colored::Colorize;
use guardian_lib::{simulate_with_limit, DecisionMetrics, StepRecord, StructuredLogger};
use tabled::{settings::Style, Table, Tabled};

use super::{failure, Session};
use crate::output::{
    color_ratio, format_cost, format_ratio, print_json, print_success, print_warning,
    OutputFormat,
};

/// Row for the per-step table
#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "Step")]
    step: u64,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Paid so far")]
    cumulative: String,
}

impl From<&StepRecord> for StepRow {
    fn from(record: &StepRecord) -> Self {
        Self {
            step: record.step,
            action: record.action.to_string(),
            cumulative: format_cost(record.cumulative_cost),
        }
    }
}

/// Replay a session of `actual_duration` steps, deciding at most
/// `max_steps` of them
pub fn run(
    session: &Session,
    actual_duration: f64,
    max_steps: u64,
    show_metrics: bool,
    logger: &StructuredLogger,
    metrics: &DecisionMetrics,
    format: OutputFormat,
) -> Result<()> {
    let report = simulate_with_limit(&session.laa, actual_duration, session.trust, max_steps)
        .map_err(|err| failure(err, logger, metrics))?;
    metrics.record_report(&report);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            let p = report.recorded.prediction;
            println!("{}", "Simulation".bold());
            println!("{}", "=".repeat(50));
            println!(
                "Prediction:             {:.2} (± {:.2})",
                p.predicted_duration, p.uncertainty
            );
            println!("Trust level:            {:.2}", report.trust_level);
            println!(
                "Threshold:              {:.2} ({:?} uncertainty)",
                report.threshold.threshold, report.threshold.regime
            );
            println!();

            if !report.steps.is_empty() {
                let rows: Vec<StepRow> = report.steps.iter().map(StepRow::from).collect();
                let table = Table::new(rows).with(Style::rounded()).to_string();
                println!("{}", table);
                println!();
            }

            match report.commit_step {
                Some(step) => print_success(&format!("Committed at step {}", step)),
                None => print_success("Never committed; paid as we went"),
            }
            println!();

            println!("{}", "Results".bold());
            println!("{}", "-".repeat(50));
            println!("Actual duration:        {:.2}", report.actual_duration);
            println!(
                "Algorithm cost:         {}",
                format_cost(report.algorithm_cost)
            );
            println!("Optimal cost:           {}", format_cost(report.optimal_cost));
            println!(
                "Competitive ratio:      {}",
                color_ratio(report.competitive_ratio, report.guarantee)
            );
            println!("Guarantee:              {}", format_ratio(report.guarantee));
            println!();

            if report.within_guarantee {
                print_success("The algorithm performed within its worst-case guarantee");
            } else {
                print_warning("The algorithm exceeded its worst-case guarantee");
            }
        }
    }

    if show_metrics {
        println!();
        print!("{}", metrics.render()?);
    }

    Ok(())
}
