//! Guardian CLI
//!
//! Runs the learning-augmented commit-vs-pay-as-you-go decision engine:
//! single decisions, full session replays, and retrospective evaluation.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use guardian_lib::{DecisionMetrics, ProblemParams, StructuredLogger};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::evaluate::EvaluateArgs;
use commands::ProblemArgs;

const GUARDIAN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Guardian decision engine CLI
#[derive(Parser)]
#[command(name = "guardian")]
#[command(author, version, about = "Learning-augmented commit-vs-pay-as-you-go decisions", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ~/.config/guardian/config.toml)
    #[arg(long, env = "GUARDIAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decide whether to commit at a given step
    Decide {
        /// Current step (1-based) reached without committing
        #[arg(long, default_value_t = 1)]
        step: u64,

        #[command(flatten)]
        problem: ProblemArgs,
    },

    /// Replay a whole session step by step
    Simulate {
        /// Duration the session actually lasted
        #[arg(long)]
        actual_duration: f64,

        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,

        #[command(flatten)]
        problem: ProblemArgs,
    },

    /// Cost a finished session against its recorded prediction
    Evaluate {
        /// Duration the session actually lasted
        #[arg(long)]
        actual_duration: f64,

        #[command(flatten)]
        args: EvaluateArgs,
    },
}

fn init_tracing(json: bool, verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json, cli.verbose);

    let config = config::GuardianConfig::load(cli.config.as_deref())?;
    let session_id = chrono::Utc::now().format("%Y%m%dT%H%M%S").to_string();
    let logger = StructuredLogger::new(session_id);
    let metrics = DecisionMetrics::new();
    info!(version = GUARDIAN_VERSION, "Starting guardian");

    match cli.command {
        Commands::Decide { step, problem } => {
            let session = problem.into_session(&config)?;
            log_start(&logger, session.laa.params());
            commands::decide::run(&session, step, &logger, &metrics, cli.format)?;
        }
        Commands::Simulate {
            actual_duration,
            metrics: show_metrics,
            problem,
        } => {
            let session = problem.into_session(&config)?;
            log_start(&logger, session.laa.params());
            commands::simulate::run(
                &session,
                actual_duration,
                config.max_replay_steps,
                show_metrics,
                &logger,
                &metrics,
                cli.format,
            )?;
        }
        Commands::Evaluate {
            actual_duration,
            args,
        } => {
            let (model, trust) = args.into_model(&config)?;
            log_start(&logger, model.params());
            commands::evaluate::run(
                &model,
                trust,
                actual_duration,
                &logger,
                &metrics,
                cli.format,
            )?;
        }
    }

    Ok(())
}

fn log_start(logger: &StructuredLogger, params: &ProblemParams) {
    logger.log_startup(GUARDIAN_VERSION, params.commit_cost(), params.step_cost());
}
