//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use guardian_lib::Action;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a cost
pub fn format_cost(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format a competitive ratio; infinite ratios read as unbounded
pub fn format_ratio(ratio: f64) -> String {
    if ratio.is_infinite() {
        "unbounded".to_string()
    } else {
        format!("{:.2}x", ratio)
    }
}

/// Format a unix timestamp as RFC 3339
pub fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

/// Color an action
pub fn color_action(action: Action) -> String {
    match action {
        Action::Commit => action.as_str().green().bold().to_string(),
        Action::PayAsYouGo => action.as_str().yellow().to_string(),
    }
}

/// Color a ratio against its guarantee
pub fn color_ratio(ratio: f64, guarantee: f64) -> String {
    let formatted = format_ratio(ratio);
    if ratio <= guarantee {
        formatted.green().to_string()
    } else {
        formatted.red().to_string()
    }
}
