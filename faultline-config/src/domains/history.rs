//! Run history and regression detection configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// History store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Directory holding per-test history documents
    pub dir: PathBuf,

    /// Entries older than this are pruned
    pub max_age_days: u32,

    /// At most this many entries are kept per test
    pub max_entries: usize,

    /// Regression detection for the CI gate
    pub regression: RegressionConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("performance-history"),
            max_age_days: default_max_age_days(),
            max_entries: default_max_entries(),
            regression: RegressionConfig::default(),
        }
    }
}

/// Which metrics the gate watches for regressions, and how much
/// endpoint-to-endpoint growth counts as one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Trend window, in days
    pub window_days: u32,

    /// Minimum percent change to flag
    pub min_percent_change: f64,

    /// Metric paths watched (all lower-is-better)
    pub metrics: Vec<String>,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            min_percent_change: 10.0,
            metrics: vec![
                "page_load.dom_content_loaded".to_string(),
                "page_load.load_complete".to_string(),
                "api.average_response_time".to_string(),
            ],
        }
    }
}

impl Validatable for HistoryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.max_age_days, "max_age_days", self.domain_name())?;
        validate_positive(self.max_entries, "max_entries", self.domain_name())?;
        validate_positive(
            self.regression.window_days,
            "regression.window_days",
            self.domain_name(),
        )?;
        validate_positive(
            self.regression.min_percent_change,
            "regression.min_percent_change",
            self.domain_name(),
        )?;

        if self.dir.as_os_str().is_empty() {
            return Err(self.validation_error("dir cannot be empty"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "history"
    }
}

// Default value functions
fn default_max_age_days() -> u32 {
    30
}

fn default_max_entries() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_config_defaults() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_age_days, 30);
        assert_eq!(config.max_entries, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_history_config_validation() {
        let mut config = HistoryConfig::default();
        config.max_entries = 0;
        assert!(config.validate().is_err());

        config = HistoryConfig::default();
        config.dir = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
