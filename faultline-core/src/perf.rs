//! Performance snapshot records
//!
//! One `PerformanceSnapshot` is produced per measurement session and is
//! never mutated afterward. Metrics the platform cannot report are
//! zeros (memory) or `None` (paint timings) rather than errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page-load timing, in milliseconds since navigation start
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLoadMetrics {
    pub dom_content_loaded_ms: f64,
    pub load_complete_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_paint_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_contentful_paint_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_contentful_paint_ms: Option<f64>,
}

/// Network-level request counts and sizes for the session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkMetrics {
    pub total_requests: u64,
    pub transferred_bytes: u64,
    /// Entries reporting zero transfer size but a nonzero decoded size
    pub cached_requests: u64,
    pub failed_requests: u64,
    /// Request count per resource type (script, stylesheet, fetch, ...)
    pub by_type: BTreeMap<String, u64>,
}

/// A named duration, used for slowest-call and slowest-interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTiming {
    pub name: String,
    pub duration_ms: f64,
}

/// Observed API call aggregates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiMetrics {
    pub total_calls: u64,
    /// Arithmetic mean over successful (2xx) calls only
    pub average_response_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slowest_call: Option<CallTiming>,
    pub failed_calls: u64,
}

/// Measured user-interaction aggregates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionMetrics {
    pub total_interactions: u64,
    pub average_duration_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slowest_interaction: Option<CallTiming>,
}

/// Loaded-resource aggregates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceMetrics {
    pub total_count: u64,
    pub total_bytes: u64,
    pub average_load_time_ms: f64,
    pub by_type: BTreeMap<String, u64>,
}

/// Heap readings; all zeros when the engine exposes no memory API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryMetrics {
    pub used_heap_bytes: u64,
    pub total_heap_bytes: u64,
    pub heap_limit_bytes: u64,
}

/// Session wall-clock bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTiming {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: f64,
}

impl Default for SessionTiming {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            duration_ms: 0.0,
        }
    }
}

/// Immutable record of one measurement session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSnapshot {
    pub page_load: PageLoadMetrics,
    pub network: NetworkMetrics,
    pub api: ApiMetrics,
    pub interactions: InteractionMetrics,
    pub resources: ResourceMetrics,
    pub memory: MemoryMetrics,
    pub timing: SessionTiming,
}

impl PerformanceSnapshot {
    /// Resolve a dotted metric path (e.g. `page_load.dom_content_loaded`
    /// or `api.average_response_time`) to its value.
    ///
    /// Optional metrics resolve to `None` when absent; unknown paths
    /// resolve to `None`.
    pub fn metric(&self, path: &str) -> Option<f64> {
        match path {
            "page_load.dom_content_loaded" => Some(self.page_load.dom_content_loaded_ms),
            "page_load.load_complete" => Some(self.page_load.load_complete_ms),
            "page_load.first_paint" => self.page_load.first_paint_ms,
            "page_load.first_contentful_paint" => self.page_load.first_contentful_paint_ms,
            "page_load.largest_contentful_paint" => self.page_load.largest_contentful_paint_ms,
            "network.total_requests" => Some(self.network.total_requests as f64),
            "network.transferred_bytes" => Some(self.network.transferred_bytes as f64),
            "network.cached_requests" => Some(self.network.cached_requests as f64),
            "network.failed_requests" => Some(self.network.failed_requests as f64),
            "api.total_calls" => Some(self.api.total_calls as f64),
            "api.average_response_time" => Some(self.api.average_response_time_ms),
            "api.failed_calls" => Some(self.api.failed_calls as f64),
            "interactions.total" => Some(self.interactions.total_interactions as f64),
            "interactions.average_duration" => Some(self.interactions.average_duration_ms),
            "resources.total_count" => Some(self.resources.total_count as f64),
            "resources.total_bytes" => Some(self.resources.total_bytes as f64),
            "resources.average_load_time" => Some(self.resources.average_load_time_ms),
            "memory.used_heap_bytes" => Some(self.memory.used_heap_bytes as f64),
            "memory.total_heap_bytes" => Some(self.memory.total_heap_bytes as f64),
            "memory.heap_limit_bytes" => Some(self.memory.heap_limit_bytes as f64),
            _ => None,
        }
    }
}
