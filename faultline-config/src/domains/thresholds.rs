//! Performance threshold budgets
//!
//! Budgets are grouped into environment profiles (development,
//! production, ci) and named flow profiles that override the selected
//! environment profile per field.

use crate::error::ConfigResult;
use crate::validation::Validatable;
use faultline_core::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// One metric budget: a ceiling plus the severity a violation carries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub max: f64,
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

fn default_severity() -> Severity {
    Severity::Error
}

impl Budget {
    pub fn error(max: f64) -> Self {
        Self {
            max,
            severity: Severity::Error,
        }
    }

    pub fn warning(max: f64) -> Self {
        Self {
            max,
            severity: Severity::Warning,
        }
    }
}

/// Target environment selecting one of the built-in profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Ci,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
            Environment::Ci => write!(f, "ci"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "ci" => Ok(Environment::Ci),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Page-load budgets, in milliseconds
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLoadThresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_complete: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_contentful_paint: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_contentful_paint: Option<Budget>,
}

/// Network budgets (counts and bytes)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkThresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_requests: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transferred_bytes: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_requests: Option<Budget>,
}

/// API call budgets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiThresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_response_time: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_calls: Option<Budget>,
}

/// Interaction budgets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionThresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_duration: Option<Budget>,
}

/// Resource budgets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceThresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_load_time: Option<Budget>,
}

/// Memory budgets (bytes)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryThresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_heap_bytes: Option<Budget>,
}

/// A full set of budgets; unset fields are unchecked
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdProfile {
    pub page_load: PageLoadThresholds,
    pub network: NetworkThresholds,
    pub api: ApiThresholds,
    pub interactions: InteractionThresholds,
    pub resources: ResourceThresholds,
    pub memory: MemoryThresholds,
}

impl ThresholdProfile {
    /// Overlay another profile: fields set in `overlay` replace the
    /// corresponding fields here, unset fields fall through.
    pub fn merged(&self, overlay: &ThresholdProfile) -> ThresholdProfile {
        ThresholdProfile {
            page_load: PageLoadThresholds {
                dom_content_loaded: overlay
                    .page_load
                    .dom_content_loaded
                    .or(self.page_load.dom_content_loaded),
                load_complete: overlay.page_load.load_complete.or(self.page_load.load_complete),
                first_contentful_paint: overlay
                    .page_load
                    .first_contentful_paint
                    .or(self.page_load.first_contentful_paint),
                largest_contentful_paint: overlay
                    .page_load
                    .largest_contentful_paint
                    .or(self.page_load.largest_contentful_paint),
            },
            network: NetworkThresholds {
                total_requests: overlay.network.total_requests.or(self.network.total_requests),
                transferred_bytes: overlay
                    .network
                    .transferred_bytes
                    .or(self.network.transferred_bytes),
                failed_requests: overlay.network.failed_requests.or(self.network.failed_requests),
            },
            api: ApiThresholds {
                average_response_time: overlay
                    .api
                    .average_response_time
                    .or(self.api.average_response_time),
                failed_calls: overlay.api.failed_calls.or(self.api.failed_calls),
            },
            interactions: InteractionThresholds {
                average_duration: overlay
                    .interactions
                    .average_duration
                    .or(self.interactions.average_duration),
            },
            resources: ResourceThresholds {
                total_count: overlay.resources.total_count.or(self.resources.total_count),
                total_bytes: overlay.resources.total_bytes.or(self.resources.total_bytes),
                average_load_time: overlay
                    .resources
                    .average_load_time
                    .or(self.resources.average_load_time),
            },
            memory: MemoryThresholds {
                used_heap_bytes: overlay.memory.used_heap_bytes.or(self.memory.used_heap_bytes),
            },
        }
    }

    /// Every configured budget as `(category, metric, budget)`, in the
    /// fixed check order used by the validator.
    pub fn budgets(&self) -> Vec<(&'static str, &'static str, Budget)> {
        let mut out = Vec::new();
        let mut push = |category, metric, budget: Option<Budget>| {
            if let Some(budget) = budget {
                out.push((category, metric, budget));
            }
        };

        push("page_load", "dom_content_loaded", self.page_load.dom_content_loaded);
        push("page_load", "load_complete", self.page_load.load_complete);
        push(
            "page_load",
            "first_contentful_paint",
            self.page_load.first_contentful_paint,
        );
        push(
            "page_load",
            "largest_contentful_paint",
            self.page_load.largest_contentful_paint,
        );
        push("network", "total_requests", self.network.total_requests);
        push("network", "transferred_bytes", self.network.transferred_bytes);
        push("network", "failed_requests", self.network.failed_requests);
        push("api", "average_response_time", self.api.average_response_time);
        push("api", "failed_calls", self.api.failed_calls);
        push("interactions", "average_duration", self.interactions.average_duration);
        push("resources", "total_count", self.resources.total_count);
        push("resources", "total_bytes", self.resources.total_bytes);
        push("resources", "average_load_time", self.resources.average_load_time);
        push("memory", "used_heap_bytes", self.memory.used_heap_bytes);

        out
    }
}

/// Threshold configuration: environment profiles plus flow overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub development: ThresholdProfile,
    pub production: ThresholdProfile,
    pub ci: ThresholdProfile,

    /// Named flow profiles (login, dashboard, ...) overriding the
    /// selected environment profile per field
    pub flows: BTreeMap<String, ThresholdProfile>,
}

impl ThresholdsConfig {
    /// Resolve the effective profile for an environment and optional flow
    pub fn resolve(&self, environment: Environment, flow: Option<&str>) -> ThresholdProfile {
        let base = match environment {
            Environment::Development => &self.development,
            Environment::Production => &self.production,
            Environment::Ci => &self.ci,
        };

        match flow.and_then(|name| self.flows.get(name)) {
            Some(overlay) => base.merged(overlay),
            None => base.clone(),
        }
    }
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            development: default_development_profile(),
            production: default_production_profile(),
            ci: default_ci_profile(),
            flows: BTreeMap::new(),
        }
    }
}

impl Validatable for ThresholdsConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (name, profile) in [
            ("development", &self.development),
            ("production", &self.production),
            ("ci", &self.ci),
        ] {
            validate_profile(profile, name, self.domain_name())?;
        }

        for (name, profile) in &self.flows {
            validate_profile(profile, name, self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "thresholds"
    }
}

fn validate_profile(profile: &ThresholdProfile, name: &str, domain: &str) -> ConfigResult<()> {
    for (category, metric, budget) in profile.budgets() {
        if budget.max < 0.0 || !budget.max.is_finite() {
            return Err(crate::error::ConfigError::DomainError {
                domain: domain.to_string(),
                message: format!(
                    "profile '{}': {}.{} budget must be finite and non-negative, got {}",
                    name, category, metric, budget.max
                ),
            });
        }
    }
    Ok(())
}

// Default profiles. Development is loose, production is strict, ci sits
// between them with error severity on the metrics the gate blocks on.

fn default_development_profile() -> ThresholdProfile {
    ThresholdProfile {
        page_load: PageLoadThresholds {
            dom_content_loaded: Some(Budget::warning(3000.0)),
            load_complete: Some(Budget::warning(8000.0)),
            first_contentful_paint: Some(Budget::warning(3000.0)),
            largest_contentful_paint: Some(Budget::warning(4000.0)),
        },
        network: NetworkThresholds {
            total_requests: Some(Budget::warning(150.0)),
            transferred_bytes: Some(Budget::warning(8.0 * 1024.0 * 1024.0)),
            failed_requests: Some(Budget::warning(5.0)),
        },
        api: ApiThresholds {
            average_response_time: Some(Budget::warning(1000.0)),
            failed_calls: Some(Budget::warning(3.0)),
        },
        interactions: InteractionThresholds {
            average_duration: Some(Budget::warning(500.0)),
        },
        resources: ResourceThresholds {
            total_count: Some(Budget::warning(120.0)),
            total_bytes: Some(Budget::warning(8.0 * 1024.0 * 1024.0)),
            average_load_time: Some(Budget::warning(800.0)),
        },
        memory: MemoryThresholds {
            used_heap_bytes: Some(Budget::warning(768.0 * 1024.0 * 1024.0)),
        },
    }
}

fn default_production_profile() -> ThresholdProfile {
    ThresholdProfile {
        page_load: PageLoadThresholds {
            dom_content_loaded: Some(Budget::error(1500.0)),
            load_complete: Some(Budget::error(3000.0)),
            first_contentful_paint: Some(Budget::error(1800.0)),
            largest_contentful_paint: Some(Budget::error(2500.0)),
        },
        network: NetworkThresholds {
            total_requests: Some(Budget::warning(75.0)),
            transferred_bytes: Some(Budget::error(3.0 * 1024.0 * 1024.0)),
            failed_requests: Some(Budget::error(0.0)),
        },
        api: ApiThresholds {
            average_response_time: Some(Budget::error(400.0)),
            failed_calls: Some(Budget::error(0.0)),
        },
        interactions: InteractionThresholds {
            average_duration: Some(Budget::error(200.0)),
        },
        resources: ResourceThresholds {
            total_count: Some(Budget::warning(60.0)),
            total_bytes: Some(Budget::error(3.0 * 1024.0 * 1024.0)),
            average_load_time: Some(Budget::error(400.0)),
        },
        memory: MemoryThresholds {
            used_heap_bytes: Some(Budget::error(256.0 * 1024.0 * 1024.0)),
        },
    }
}

fn default_ci_profile() -> ThresholdProfile {
    ThresholdProfile {
        page_load: PageLoadThresholds {
            dom_content_loaded: Some(Budget::error(2000.0)),
            load_complete: Some(Budget::error(5000.0)),
            first_contentful_paint: Some(Budget::warning(2500.0)),
            largest_contentful_paint: Some(Budget::warning(3000.0)),
        },
        network: NetworkThresholds {
            total_requests: Some(Budget::warning(100.0)),
            transferred_bytes: Some(Budget::warning(5.0 * 1024.0 * 1024.0)),
            failed_requests: Some(Budget::error(0.0)),
        },
        api: ApiThresholds {
            average_response_time: Some(Budget::error(500.0)),
            failed_calls: Some(Budget::error(0.0)),
        },
        interactions: InteractionThresholds {
            average_duration: Some(Budget::warning(300.0)),
        },
        resources: ResourceThresholds {
            total_count: Some(Budget::warning(80.0)),
            total_bytes: Some(Budget::warning(5.0 * 1024.0 * 1024.0)),
            average_load_time: Some(Budget::warning(600.0)),
        },
        memory: MemoryThresholds {
            used_heap_bytes: Some(Budget::warning(512.0 * 1024.0 * 1024.0)),
        },
    }
}
