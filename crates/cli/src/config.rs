//! Configuration management for the CLI
//!
//! Settings come from an optional TOML file overlaid by `GUARDIAN_*`
//! environment variables. Command-line flags take precedence over both.

use anyhow::{Context, Result};
use guardian_lib::predictor::{DEFAULT_HISTORY_WINDOW, DEFAULT_MIN_SAMPLES};
use guardian_lib::{
    DEFAULT_COMMIT_COST, DEFAULT_MAX_REPLAY_STEPS, DEFAULT_STEP_COST, DEFAULT_TRUST_LEVEL,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuardianConfig {
    /// One-off cost of committing
    #[serde(default = "default_commit_cost")]
    pub commit_cost: f64,

    /// Cost paid per step while not committed
    #[serde(default = "default_step_cost")]
    pub step_cost: f64,

    /// Trust placed in the predictor, in (0, 1]
    #[serde(default = "default_trust_level")]
    pub trust_level: f64,

    /// Number of most recent sessions the history predictor summarises
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Sessions required before the history predictor answers
    #[serde(default = "default_min_history")]
    pub min_history: usize,

    /// Most steps `simulate` decides one at a time
    #[serde(default = "default_max_replay_steps")]
    pub max_replay_steps: u64,
}

fn default_commit_cost() -> f64 {
    DEFAULT_COMMIT_COST
}

fn default_step_cost() -> f64 {
    DEFAULT_STEP_COST
}

fn default_trust_level() -> f64 {
    DEFAULT_TRUST_LEVEL
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_min_history() -> usize {
    DEFAULT_MIN_SAMPLES
}

fn default_max_replay_steps() -> u64 {
    DEFAULT_MAX_REPLAY_STEPS
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            commit_cost: default_commit_cost(),
            step_cost: default_step_cost(),
            trust_level: default_trust_level(),
            history_window: default_history_window(),
            min_history: default_min_history(),
            max_replay_steps: default_max_replay_steps(),
        }
    }
}

impl GuardianConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = Self::default_path() {
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        let config = builder
            .add_source(config::Environment::with_prefix("GUARDIAN").try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Default configuration file path
    fn default_path() -> Option<PathBuf> {
        let home = dirs_next::home_dir()?;
        Some(home.join(".config").join("guardian").join("config.toml"))
    }
}
