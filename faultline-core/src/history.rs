//! Persisted run history and derived trend records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::perf::PerformanceSnapshot;
use crate::validation::ValidationResult;

/// Context recorded alongside each run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunMetadata {
    pub browser: String,
    pub viewport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// One validated run, appended to a test's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub test_name: String,
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub snapshot: PerformanceSnapshot,
    pub validation: ValidationResult,
    #[serde(default)]
    pub metadata: RunMetadata,
}

impl HistoryEntry {
    pub fn new(
        test_name: impl Into<String>,
        environment: impl Into<String>,
        snapshot: PerformanceSnapshot,
        validation: ValidationResult,
        metadata: RunMetadata,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            environment: environment.into(),
            snapshot,
            validation,
            metadata,
        }
    }

    /// Row written to the current-run summary document
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            test_name: self.test_name.clone(),
            timestamp: self.timestamp,
            commit: self.metadata.commit.clone(),
            branch: self.metadata.branch.clone(),
            passed: self.validation.passed,
            error_count: self.validation.error_count,
            warning_count: self.validation.warning_count,
        }
    }
}

/// Compact per-run row in the current-run summary document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub test_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub passed: bool,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Direction of a metric over recent runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Least-squares trend over one metric, recomputed on demand.
///
/// The regression runs over sample index, not elapsed time, so the
/// slope magnitude is distorted by irregular sampling; direction is
/// the signal consumers rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub slope: f64,
    pub absolute_change: f64,
    pub percent_change: f64,
    pub first: f64,
    pub last: f64,
    pub sample_count: usize,
}
