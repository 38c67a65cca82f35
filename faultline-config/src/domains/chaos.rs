//! Chaos run defaults

use crate::error::ConfigResult;
use crate::validation::{validate_enum_choice, validate_positive, validate_probability, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fault kind names the orchestrator may draw from
const KNOWN_FAULT_KINDS: [&str; 8] = [
    "disconnect",
    "slow",
    "intermittent",
    "dns",
    "http_error",
    "timeout",
    "rate_limit",
    "overload",
];

/// Defaults applied when a chaos run does not specify its own options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosConfig {
    /// Per-tick probability of activating a fault
    pub failure_rate: f64,

    /// Total run duration
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub duration: Duration,

    /// Fault kinds drawn from on each trial
    pub fault_kinds: Vec<String>,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            failure_rate: default_failure_rate(),
            duration: default_duration(),
            fault_kinds: vec!["disconnect".to_string(), "http_error".to_string(), "slow".to_string()],
        }
    }
}

impl Validatable for ChaosConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_probability(self.failure_rate, "failure_rate", self.domain_name())?;
        validate_positive(self.duration.as_secs(), "duration", self.domain_name())?;

        if self.fault_kinds.is_empty() {
            return Err(self.validation_error("fault_kinds cannot be empty"));
        }
        for kind in &self.fault_kinds {
            validate_enum_choice(kind, &KNOWN_FAULT_KINDS, "fault_kinds", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "chaos"
    }
}

// Default value functions
fn default_failure_rate() -> f64 {
    0.3
}

fn default_duration() -> Duration {
    Duration::from_secs(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaos_config_defaults() {
        let config = ChaosConfig::default();
        assert_eq!(config.failure_rate, 0.3);
        assert_eq!(config.duration, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chaos_config_validation() {
        let mut config = ChaosConfig::default();
        config.failure_rate = 1.5;
        assert!(config.validate().is_err());

        config = ChaosConfig::default();
        config.fault_kinds = vec!["explode".to_string()];
        assert!(config.validate().is_err());

        config = ChaosConfig::default();
        config.fault_kinds.clear();
        assert!(config.validate().is_err());
    }
}
