//! Configuration loading and environment variable handling

use crate::domains::FaultlineConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "FAULTLINE".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<FaultlineConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: FaultlineConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<FaultlineConfig> {
        let mut config = FaultlineConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<FaultlineConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut FaultlineConfig) -> ConfigResult<()> {
        self.apply_history_overrides(&mut config.history)?;
        self.apply_chaos_overrides(&mut config.chaos)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply history config overrides
    fn apply_history_overrides(
        &self,
        config: &mut crate::domains::history::HistoryConfig,
    ) -> ConfigResult<()> {
        if let Ok(dir) = self.get_env_var("HISTORY_DIR") {
            config.dir = dir.into();
        }

        if let Ok(days) = self.get_env_var("HISTORY_MAX_AGE_DAYS") {
            config.max_age_days = days
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HISTORY_MAX_AGE_DAYS: {}", e)))?;
        }

        if let Ok(entries) = self.get_env_var("HISTORY_MAX_ENTRIES") {
            config.max_entries = entries
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HISTORY_MAX_ENTRIES: {}", e)))?;
        }

        Ok(())
    }

    /// Apply chaos config overrides
    fn apply_chaos_overrides(
        &self,
        config: &mut crate::domains::chaos::ChaosConfig,
    ) -> ConfigResult<()> {
        if let Ok(rate) = self.get_env_var("CHAOS_FAILURE_RATE") {
            config.failure_rate = rate
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid CHAOS_FAILURE_RATE: {}", e)))?;
        }

        if let Ok(duration) = self.get_env_var("CHAOS_DURATION_SECONDS") {
            let seconds: u64 = duration.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid CHAOS_DURATION_SECONDS: {}", e))
            })?;
            config.duration = std::time::Duration::from_secs(seconds);
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        use std::str::FromStr;

        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "history:\n  max_age_days: 14\n  max_entries: 50\nchaos:\n  failure_rate: 0.5\n"
        )
        .unwrap();

        let config = ConfigLoader::new().from_file(file.path()).unwrap();
        assert_eq!(config.history.max_age_days, 14);
        assert_eq!(config.history.max_entries, 50);
        assert_eq!(config.chaos.failure_rate, 0.5);
        // Untouched domains keep their defaults
        assert_eq!(config.history.regression.window_days, 7);
    }

    #[test]
    fn test_invalid_file_config_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chaos:\n  failure_rate: 2.0\n").unwrap();

        assert!(ConfigLoader::new().from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_override() {
        // Unique prefix keeps this test independent of the process env.
        std::env::set_var("FLTEST_HISTORY_MAX_ENTRIES", "7");
        let config = ConfigLoader::with_prefix("FLTEST").from_env().unwrap();
        std::env::remove_var("FLTEST_HISTORY_MAX_ENTRIES");

        assert_eq!(config.history.max_entries, 7);
    }
}
