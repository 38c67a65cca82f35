//! Measurement sessions

use chrono::{DateTime, Utc};
use faultline_core::{
    ApiMetrics, CallTiming, InteractionMetrics, MemoryMetrics, NetworkMetrics, PageLoadMetrics,
    PerformanceSnapshot, ResourceMetrics, SessionTiming,
};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::probe::PerformanceProbe;

/// One observed API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub url: String,
    pub duration_ms: f64,
    /// Zero when the call failed at the network level
    pub status: u16,
    pub success: bool,
    pub transfer_bytes: u64,
}

#[derive(Debug, Clone)]
struct InteractionRecord {
    label: String,
    duration_ms: f64,
}

#[derive(Debug, Default)]
struct SessionState {
    active: bool,
    started_at_instant: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
    api_calls: Vec<ApiCall>,
    interactions: Vec<InteractionRecord>,
}

/// Records one bounded measurement session at a time.
///
/// Cloning shares the underlying session, which is how the
/// [`ObservedClient`](crate::ObservedClient) decorator feeds calls
/// into the collector that created it.
#[derive(Debug, Clone, Default)]
pub struct PerformanceCollector {
    state: Arc<Mutex<SessionState>>,
}

impl PerformanceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counters and begin observing
    pub fn start_measurement(&self) {
        let mut state = self.state.lock();
        *state = SessionState {
            active: true,
            started_at_instant: Some(Instant::now()),
            started_at: Some(Utc::now()),
            ..SessionState::default()
        };
        debug!("Measurement session started");
    }

    /// Whether a session is in progress
    pub fn is_measuring(&self) -> bool {
        self.state.lock().active
    }

    /// Record one observed API call; ignored outside a session
    pub fn record_api_call(&self, call: ApiCall) {
        let mut state = self.state.lock();
        if !state.active {
            return;
        }
        debug!(
            "Observed API call: {} ({} ms, status {})",
            call.url, call.duration_ms, call.status
        );
        state.api_calls.push(call);
    }

    /// Measure one user action, returning its result unchanged.
    ///
    /// The duration is recorded whether the action succeeds or fails;
    /// an error from the action propagates unmodified so measurement
    /// never masks a test failure.
    pub async fn measure_interaction<F, T, E>(&self, label: &str, action: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let result = action.await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let mut state = self.state.lock();
        if state.active {
            debug!("Interaction '{}' took {} ms", label, duration_ms);
            state.interactions.push(InteractionRecord {
                label: label.to_string(),
                duration_ms,
            });
        }

        result
    }

    /// End the session and assemble the immutable snapshot.
    ///
    /// Platform readings the probe cannot provide degrade to zeros.
    /// Calling this without a started session yields an empty snapshot.
    pub fn stop_measurement(&self, probe: &dyn PerformanceProbe) -> PerformanceSnapshot {
        let mut state = self.state.lock();
        if !state.active {
            warn!("stop_measurement called without an active session");
        }

        let finished_at = Utc::now();
        let duration_ms = state
            .started_at_instant
            .map(|at| at.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        let started_at = state.started_at.unwrap_or(finished_at);

        let api = aggregate_api_calls(&state.api_calls);
        let interactions = aggregate_interactions(&state.interactions);

        let resource_entries = probe.resources();
        let resources = aggregate_resources(&resource_entries);
        let network = aggregate_network(&state.api_calls, &resource_entries);

        let page_load = probe.page_load().unwrap_or_else(|| {
            debug!("Probe reports no page-load timing; degrading to zeros");
            PageLoadMetrics::default()
        });
        let memory = probe.memory().unwrap_or_else(|| {
            debug!("Probe reports no memory readings; degrading to zeros");
            MemoryMetrics::default()
        });

        *state = SessionState::default();

        PerformanceSnapshot {
            page_load,
            network,
            api,
            interactions,
            resources,
            memory,
            timing: SessionTiming {
                started_at,
                finished_at,
                duration_ms,
            },
        }
    }
}

/// Mean response time over successful (2xx) calls only; failures are a
/// separate tally. Slowest call is the argmax, first observed winning
/// ties.
fn aggregate_api_calls(calls: &[ApiCall]) -> ApiMetrics {
    let successful: Vec<&ApiCall> = calls.iter().filter(|call| call.success).collect();
    let failed_calls = (calls.len() - successful.len()) as u64;

    let average_response_time_ms = if successful.is_empty() {
        0.0
    } else {
        successful.iter().map(|call| call.duration_ms).sum::<f64>() / successful.len() as f64
    };

    let slowest_call = calls
        .iter()
        .fold(None::<&ApiCall>, |slowest, call| match slowest {
            Some(current) if call.duration_ms > current.duration_ms => Some(call),
            Some(current) => Some(current),
            None => Some(call),
        })
        .map(|call| CallTiming {
            name: call.url.clone(),
            duration_ms: call.duration_ms,
        });

    ApiMetrics {
        total_calls: calls.len() as u64,
        average_response_time_ms,
        slowest_call,
        failed_calls,
    }
}

fn aggregate_interactions(interactions: &[InteractionRecord]) -> InteractionMetrics {
    let average_duration_ms = if interactions.is_empty() {
        0.0
    } else {
        interactions.iter().map(|i| i.duration_ms).sum::<f64>() / interactions.len() as f64
    };

    let slowest_interaction = interactions
        .iter()
        .fold(None::<&InteractionRecord>, |slowest, record| match slowest {
            Some(current) if record.duration_ms > current.duration_ms => Some(record),
            Some(current) => Some(current),
            None => Some(record),
        })
        .map(|record| CallTiming {
            name: record.label.clone(),
            duration_ms: record.duration_ms,
        });

    InteractionMetrics {
        total_interactions: interactions.len() as u64,
        average_duration_ms,
        slowest_interaction,
    }
}

fn aggregate_resources(entries: &[crate::probe::ResourceEntry]) -> ResourceMetrics {
    let average_load_time_ms = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.duration_ms).sum::<f64>() / entries.len() as f64
    };

    let mut by_type = std::collections::BTreeMap::new();
    for entry in entries {
        *by_type.entry(entry.resource_type.clone()).or_insert(0u64) += 1;
    }

    ResourceMetrics {
        total_count: entries.len() as u64,
        total_bytes: entries.iter().map(|e| e.transfer_size_bytes).sum(),
        average_load_time_ms,
        by_type,
    }
}

/// Network totals span both resource-timing entries and observed API
/// calls; cache hits are resource entries with zero transfer size but
/// a nonzero decoded size.
fn aggregate_network(
    calls: &[ApiCall],
    entries: &[crate::probe::ResourceEntry],
) -> NetworkMetrics {
    let mut by_type = std::collections::BTreeMap::new();
    for entry in entries {
        *by_type.entry(entry.resource_type.clone()).or_insert(0u64) += 1;
    }
    if !calls.is_empty() {
        *by_type.entry("fetch".to_string()).or_insert(0) += calls.len() as u64;
    }

    NetworkMetrics {
        total_requests: (entries.len() + calls.len()) as u64,
        transferred_bytes: entries.iter().map(|e| e.transfer_size_bytes).sum::<u64>()
            + calls.iter().map(|c| c.transfer_bytes).sum::<u64>(),
        cached_requests: entries.iter().filter(|e| e.is_cache_hit()).count() as u64,
        failed_requests: calls.iter().filter(|c| !c.success).count() as u64,
        by_type,
    }
}
