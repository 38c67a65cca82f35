//! Chaos run options

use faultline_config::ChaosConfig;
use faultline_core::{FaultBody, FaultKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chaos error types
#[derive(Debug, thiserror::Error)]
pub enum ChaosError {
    /// No endpoints to target
    #[error("At least one endpoint pattern is required")]
    NoEndpoints,

    /// No fault kinds to draw from
    #[error("At least one fault kind is required")]
    NoFaultKinds,

    /// Failure rate outside [0, 1]
    #[error("failure_rate must be within [0, 1], got {0}")]
    InvalidFailureRate(f64),
}

/// Options for one chaos run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaosOptions {
    /// Per-tick probability of activating a fault
    pub failure_rate: f64,

    /// Fault kinds drawn from uniformly on each trial
    pub fault_kinds: Vec<FaultKind>,

    /// Total run duration; the run stops and clears itself afterwards
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl Default for ChaosOptions {
    fn default() -> Self {
        Self {
            failure_rate: 0.3,
            fault_kinds: vec![
                kind_for_name("disconnect"),
                kind_for_name("http_error"),
                kind_for_name("slow"),
            ],
            duration: Duration::from_secs(30),
        }
    }
}

impl ChaosOptions {
    /// Build options from the configured defaults, mapping fault kind
    /// names to kinds with representative parameters. Unknown names
    /// were already rejected by config validation.
    pub fn from_config(config: &ChaosConfig) -> Self {
        Self {
            failure_rate: config.failure_rate,
            fault_kinds: config.fault_kinds.iter().map(|name| kind_for_name(name)).collect(),
            duration: config.duration,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ChaosError> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ChaosError::InvalidFailureRate(self.failure_rate));
        }
        if self.fault_kinds.is_empty() {
            return Err(ChaosError::NoFaultKinds);
        }
        Ok(())
    }
}

/// Representative parameters per fault kind name
fn kind_for_name(name: &str) -> FaultKind {
    match name {
        "slow" => FaultKind::Slow {
            latency: Duration::from_secs(2),
        },
        "intermittent" => FaultKind::Intermittent {
            failure_probability: 0.5,
        },
        "dns" => FaultKind::Dns,
        "http_error" => FaultKind::HttpError {
            status: 500,
            body: FaultBody::default(),
            delay: None,
        },
        "timeout" => FaultKind::Timeout {
            hang: Duration::from_secs(30),
        },
        "rate_limit" => FaultKind::RateLimit {
            limit: 10,
            window: Duration::from_secs(60),
            retry_after_secs: 1,
        },
        "overload" => FaultKind::Overload {
            failure_probability: 0.5,
            delay: Some(Duration::from_secs(1)),
        },
        // Default to a short disconnect for "disconnect" and anything
        // unrecognized; config validation keeps the latter out.
        _ => FaultKind::Disconnect {
            duration: Duration::from_secs(5),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_rate() {
        let mut options = ChaosOptions::default();
        options.failure_rate = 1.2;
        assert!(matches!(
            options.validate(),
            Err(ChaosError::InvalidFailureRate(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_kinds() {
        let mut options = ChaosOptions::default();
        options.fault_kinds.clear();
        assert!(matches!(options.validate(), Err(ChaosError::NoFaultKinds)));
    }

    #[test]
    fn test_from_config_maps_names() {
        let config = ChaosConfig::default();
        let options = ChaosOptions::from_config(&config);
        assert_eq!(options.failure_rate, config.failure_rate);
        assert_eq!(options.fault_kinds.len(), config.fault_kinds.len());
    }
}
