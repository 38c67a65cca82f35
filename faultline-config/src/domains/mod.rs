//! Domain-specific configuration modules

pub mod chaos;
pub mod history;
pub mod logging;
pub mod thresholds;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main Faultline configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FaultlineConfig {
    /// Performance threshold budgets per environment and flow
    #[serde(default)]
    pub thresholds: thresholds::ThresholdsConfig,

    /// Chaos run defaults
    #[serde(default)]
    pub chaos: chaos::ChaosConfig,

    /// Run history and regression detection
    #[serde(default)]
    pub history: history::HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl FaultlineConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.thresholds.validate()?;
        self.chaos.validate()?;
        self.history.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = FaultlineConfig::default();
        serde_yaml::to_string(&config).unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
