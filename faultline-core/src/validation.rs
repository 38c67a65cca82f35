//! Threshold validation results

use serde::{Deserialize, Serialize};

/// Severity attached to a threshold; warnings fail validation but by
/// convention only errors block CI (enforced by the gate, not here)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One exceeded budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub category: String,
    pub metric: String,
    pub actual: f64,
    pub threshold: f64,
    pub severity: Severity,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}.{}: {:.1} > {:.1}",
            self.severity, self.category, self.metric, self.actual, self.threshold
        )
    }
}

/// Outcome of validating a snapshot against a threshold profile.
///
/// Deterministically derived from its inputs; violations keep the
/// fixed check order (page load, network, api, interactions,
/// resources, memory), not severity order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub violations: Vec<Violation>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl ValidationResult {
    /// Build a result from an ordered violation list
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let error_count = violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        let warning_count = violations.len() - error_count;
        Self {
            passed: violations.is_empty(),
            violations,
            error_count,
            warning_count,
        }
    }

    /// Whether any error-severity violation exists
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::from_violations(Vec::new())
    }
}
