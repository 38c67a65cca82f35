//! Threshold validation

use faultline_config::ThresholdProfile;
use faultline_core::{PerformanceSnapshot, ValidationResult, Violation};

/// Compare a snapshot against a threshold profile.
///
/// Pure function: identical inputs always yield an identical result.
/// A violation is appended whenever `actual > budget`; violations keep
/// the profile's fixed check order (page load, network, api,
/// interactions, resources, memory). Metrics the snapshot could not
/// measure (absent paint timings) are skipped, not violated.
pub fn validate(snapshot: &PerformanceSnapshot, thresholds: &ThresholdProfile) -> ValidationResult {
    let mut violations = Vec::new();

    for (category, metric, budget) in thresholds.budgets() {
        let path = format!("{}.{}", category, metric);
        let Some(actual) = snapshot.metric(&path) else {
            continue;
        };

        if actual > budget.max {
            violations.push(Violation {
                category: category.to_string(),
                metric: metric.to_string(),
                actual,
                threshold: budget.max,
                severity: budget.severity,
            });
        }
    }

    ValidationResult::from_violations(violations)
}
