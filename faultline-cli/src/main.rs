//! Faultline CLI entry point
//!
//! Exit code contract: 0 when every gate passes, 1 when any
//! error-severity violation or detected regression exists. Warnings
//! are printed but do not block.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use faultline_collector::validate;
use faultline_config::{ConfigLoader, Environment, FaultlineConfig};
use faultline_core::{
    HistoryEntry, PerformanceSnapshot, RunMetadata, Severity, ValidationResult,
};
use faultline_history::HistoryStore;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate {
            snapshot,
            environment,
            flow,
        } => {
            let snapshot = read_snapshot(&snapshot)?;
            let result = validate_snapshot(&config, &snapshot, &environment, flow.as_deref())?;
            print_validation(&result);
            Ok(if result.has_errors() { 1 } else { 0 })
        }

        Commands::Record {
            test,
            snapshot,
            environment,
            flow,
            browser,
            viewport,
        } => {
            let snapshot = read_snapshot(&snapshot)?;
            let result = validate_snapshot(&config, &snapshot, &environment, flow.as_deref())?;
            print_validation(&result);

            let entry = HistoryEntry::new(
                test.clone(),
                environment,
                snapshot,
                result.clone(),
                ci_metadata(browser, viewport),
            );
            let store = HistoryStore::from_config(&config.history);
            store.record(entry).await?;
            info!("Recorded run for '{}' in {}", test, store.root().display());

            Ok(if result.has_errors() { 1 } else { 0 })
        }

        Commands::Gate {
            test,
            environment,
            flow,
        } => {
            let store = HistoryStore::from_config(&config.history);
            let Some(latest) = store.latest(&test).await? else {
                anyhow::bail!("no recorded runs for test '{}'", test);
            };

            let result =
                validate_snapshot(&config, &latest.snapshot, &environment, flow.as_deref())?;
            print_validation(&result);

            let regressions = store
                .detect_regressions(&test, &config.history.regression)
                .await?;
            for regression in &regressions {
                println!("{} {}", "regression:".red().bold(), regression);
            }
            if regressions.is_empty() {
                println!("{}", "no regressions detected".green());
            }

            Ok(if result.has_errors() || !regressions.is_empty() {
                1
            } else {
                0
            })
        }

        Commands::Trend {
            test,
            metric,
            window_days,
        } => {
            let store = HistoryStore::from_config(&config.history);
            let window = window_days.unwrap_or(config.history.regression.window_days);

            match store.trend(&test, &metric, window).await? {
                Some(trend) => {
                    println!(
                        "{} over {} run(s): {} (slope {:.3}, {:.1} -> {:.1}, {:+.1}%)",
                        metric,
                        trend.sample_count,
                        trend.direction,
                        trend.slope,
                        trend.first,
                        trend.last,
                        trend.percent_change
                    );
                }
                None => println!("insufficient data for a trend (need at least 2 runs)"),
            }
            Ok(0)
        }

        Commands::History { test, limit } => {
            let store = HistoryStore::from_config(&config.history);
            let entries = store.history(&test).await?;
            let shown = entries.len().min(limit);

            if entries.is_empty() {
                println!("no recorded runs for test '{}'", test);
                return Ok(0);
            }

            for entry in &entries[entries.len() - shown..] {
                let status = if entry.validation.passed {
                    "pass".green()
                } else {
                    "fail".red()
                };
                println!(
                    "{}  {}  {}  errors={} warnings={}  commit={}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    status,
                    entry.environment,
                    entry.validation.error_count,
                    entry.validation.warning_count,
                    entry.metadata.commit.as_deref().unwrap_or("-")
                );
            }
            Ok(0)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FaultlineConfig> {
    let loader = ConfigLoader::new();
    let config = loader
        .load(path)
        .context("failed to load configuration")?;
    debug!("Configuration loaded");
    Ok(config)
}

fn read_snapshot(path: &Path) -> Result<PerformanceSnapshot> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    Ok(snapshot)
}

fn validate_snapshot(
    config: &FaultlineConfig,
    snapshot: &PerformanceSnapshot,
    environment: &str,
    flow: Option<&str>,
) -> Result<ValidationResult> {
    let environment = Environment::from_str(environment)
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid --environment")?;
    let profile = config.thresholds.resolve(environment, flow);
    Ok(validate(snapshot, &profile))
}

/// Itemize every violated metric with actual vs threshold values
fn print_validation(result: &ValidationResult) {
    if result.passed {
        println!("{}", "all thresholds satisfied".green());
        return;
    }

    for violation in &result.violations {
        let line = format!(
            "{}.{}: {:.1} exceeds budget {:.1}",
            violation.category, violation.metric, violation.actual, violation.threshold
        );
        match violation.severity {
            Severity::Error => println!("{} {}", "error:".red().bold(), line),
            Severity::Warning => println!("{} {}", "warning:".yellow().bold(), line),
        }
    }
    println!(
        "{} error(s), {} warning(s)",
        result.error_count, result.warning_count
    );
}

/// Run metadata defaulting from CI-provided environment variables.
/// Commit and branch are only trusted when `CI` is set; local runs
/// record neither.
fn ci_metadata(browser: String, viewport: String) -> RunMetadata {
    let (commit, branch) = if is_ci() {
        (
            std::env::var("GITHUB_SHA").ok().filter(|s| !s.is_empty()),
            std::env::var("GITHUB_REF_NAME").ok().filter(|s| !s.is_empty()),
        )
    } else {
        (None, None)
    };

    RunMetadata {
        browser,
        viewport,
        commit,
        branch,
    }
}

fn is_ci() -> bool {
    std::env::var("CI").map(|v| v == "true" || v == "1").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_snapshot_uses_environment_profile() {
        let config = FaultlineConfig::default();
        let mut snapshot = PerformanceSnapshot::default();
        snapshot.page_load.dom_content_loaded_ms = 2500.0;

        // The ci profile budgets DCL at 2000 ms with error severity
        let result = validate_snapshot(&config, &snapshot, "ci", None).unwrap();
        assert!(result.has_errors());

        // The development profile is looser and only warns
        let result = validate_snapshot(&config, &snapshot, "development", None).unwrap();
        assert!(!result.has_errors());
    }

    #[test]
    fn test_invalid_environment_is_an_error() {
        let config = FaultlineConfig::default();
        let snapshot = PerformanceSnapshot::default();
        assert!(validate_snapshot(&config, &snapshot, "staging", None).is_err());
    }

    #[test]
    fn test_read_snapshot_missing_file() {
        assert!(read_snapshot(Path::new("/nonexistent/snapshot.json")).is_err());
    }
}
