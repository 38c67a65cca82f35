//! Full measurement pipeline: intercepted client -> collector ->
//! validation -> history -> trends

use faultline_collector::{
    validate, NullProbe, ObservedClient, PerformanceCollector, ResourceEntry, StaticProbe,
};
use faultline_config::{Environment, FaultlineConfig, RegressionConfig};
use faultline_core::{
    FaultBody, FaultKind, FaultRule, HistoryEntry, MemoryMetrics, PageLoadMetrics,
    PerformanceSnapshot, RunMetadata, Severity, TrendDirection,
};
use faultline_history::{HistoryStore, RetentionPolicy};
use faultline_inject::{
    FaultInjectionContext, HttpClient, HttpError, HttpRequest, HttpResponse, InterceptingClient,
};
use std::collections::HashMap;

struct OkClient;

#[async_trait::async_trait]
impl HttpClient for OkClient {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, HttpError> {
        Ok(HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: HashMap::new(),
            body: r#"{"items":[1,2,3]}"#.to_string(),
        })
    }
}

fn probe() -> StaticProbe {
    StaticProbe {
        page_load: Some(PageLoadMetrics {
            dom_content_loaded_ms: 900.0,
            load_complete_ms: 2100.0,
            first_paint_ms: Some(700.0),
            first_contentful_paint_ms: Some(850.0),
            largest_contentful_paint_ms: Some(1400.0),
        }),
        resources: vec![
            ResourceEntry {
                name: "bundle.js".to_string(),
                resource_type: "script".to_string(),
                transfer_size_bytes: 250_000,
                decoded_size_bytes: 900_000,
                duration_ms: 120.0,
            },
            ResourceEntry {
                name: "styles.css".to_string(),
                resource_type: "stylesheet".to_string(),
                transfer_size_bytes: 0,
                decoded_size_bytes: 45_000,
                duration_ms: 2.0,
            },
        ],
        memory: Some(MemoryMetrics {
            used_heap_bytes: 60_000_000,
            total_heap_bytes: 90_000_000,
            heap_limit_bytes: 2_000_000_000,
        }),
    }
}

#[tokio::test]
async fn test_measured_session_through_faulted_client() {
    let context = FaultInjectionContext::new();
    let collector = PerformanceCollector::new();
    let client = ObservedClient::new(
        InterceptingClient::new(OkClient, context.clone()),
        collector.clone(),
    );

    collector.start_measurement();

    // Two healthy calls, then a server fault on one endpoint
    client.execute(HttpRequest::get("/api/courses")).await.unwrap();
    client.execute(HttpRequest::get("/api/lessons")).await.unwrap();

    context.activate(FaultRule::new(
        "/api/courses",
        FaultKind::HttpError {
            status: 503,
            body: FaultBody::default(),
            delay: None,
        },
    ));
    let degraded = client.execute(HttpRequest::get("/api/courses")).await.unwrap();
    assert_eq!(degraded.status, 503);

    // A measured interaction whose inner result passes through
    let clicked: Result<&str, HttpError> = collector
        .measure_interaction("open-course", async { Ok("opened") })
        .await;
    assert_eq!(clicked.unwrap(), "opened");

    let snapshot = collector.stop_measurement(&probe());

    assert_eq!(snapshot.api.total_calls, 3);
    assert_eq!(snapshot.api.failed_calls, 1);
    assert_eq!(snapshot.interactions.total_interactions, 1);
    assert_eq!(snapshot.network.cached_requests, 1);
    assert_eq!(snapshot.page_load.dom_content_loaded_ms, 900.0);
    assert_eq!(snapshot.memory.used_heap_bytes, 60_000_000);
    assert!(snapshot.timing.finished_at >= snapshot.timing.started_at);
}

#[tokio::test]
async fn test_validate_record_and_read_back() {
    let config = FaultlineConfig::default();
    let profile = config.thresholds.resolve(Environment::Ci, None);

    let collector = PerformanceCollector::new();
    collector.start_measurement();
    let snapshot = collector.stop_measurement(&probe());

    let result = validate(&snapshot, &profile);
    // The fixture stays inside every ci budget
    assert!(result.passed, "unexpected violations: {:?}", result.violations);

    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path(), RetentionPolicy::default());

    let entry = HistoryEntry::new(
        "dashboard-load",
        "ci",
        snapshot,
        result,
        RunMetadata {
            browser: "chromium".to_string(),
            viewport: "1280x720".to_string(),
            commit: Some("abc1234".to_string()),
            branch: Some("main".to_string()),
        },
    );
    store.record(entry.clone()).await.unwrap();

    // Field-for-field round trip of the most recent entry
    let read_back = store.latest("dashboard-load").await.unwrap().unwrap();
    assert_eq!(read_back, entry);

    // The current-run summary reflects the same outcome
    let summaries = store.current_run().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].passed);
    assert_eq!(summaries[0].commit.as_deref(), Some("abc1234"));
}

#[tokio::test]
async fn test_slow_snapshot_violates_ci_budget() {
    let config = FaultlineConfig::default();
    let profile = config.thresholds.resolve(Environment::Ci, None);

    let mut snapshot = PerformanceSnapshot::default();
    snapshot.page_load.dom_content_loaded_ms = 2500.0;

    let result = validate(&snapshot, &profile);
    assert!(!result.passed);

    let violation = result
        .violations
        .iter()
        .find(|v| v.metric == "dom_content_loaded")
        .expect("missing dom_content_loaded violation");
    assert_eq!(violation.category, "page_load");
    assert_eq!(violation.actual, 2500.0);
    assert_eq!(violation.threshold, 2000.0);
    assert_eq!(violation.severity, Severity::Error);
}

#[tokio::test]
async fn test_degrading_runs_surface_as_regression() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path(), RetentionPolicy::default());

    for dcl in [1000.0, 1120.0, 1260.0, 1400.0] {
        let mut snapshot = PerformanceSnapshot::default();
        snapshot.page_load.dom_content_loaded_ms = dcl;
        let entry = HistoryEntry::new(
            "login-flow",
            "ci",
            snapshot,
            Default::default(),
            RunMetadata::default(),
        );
        store.record(entry).await.unwrap();
    }

    let trend = store
        .trend("login-flow", "page_load.dom_content_loaded", 7)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trend.direction, TrendDirection::Increasing);
    assert_eq!(trend.sample_count, 4);

    let regressions = store
        .detect_regressions("login-flow", &RegressionConfig::default())
        .await
        .unwrap();
    assert_eq!(regressions.len(), 1);
    assert_eq!(regressions[0].metric, "page_load.dom_content_loaded");
    assert!(regressions[0].trend.percent_change >= 10.0);
}

#[tokio::test]
async fn test_single_run_produces_no_trend() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path(), RetentionPolicy::default());

    let entry = HistoryEntry::new(
        "single",
        "ci",
        PerformanceSnapshot::default(),
        Default::default(),
        RunMetadata::default(),
    );
    store.record(entry).await.unwrap();

    let trend = store
        .trend("single", "page_load.dom_content_loaded", 7)
        .await
        .unwrap();
    assert!(trend.is_none());
}

#[tokio::test]
async fn test_collector_with_null_probe_still_validates() {
    let config = FaultlineConfig::default();
    let profile = config.thresholds.resolve(Environment::Development, None);

    let collector = PerformanceCollector::new();
    collector.start_measurement();
    let snapshot = collector.stop_measurement(&NullProbe);

    // Nothing measured, everything degraded to zeros; validation is
    // still well-defined and passes the loose development profile.
    let result = validate(&snapshot, &profile);
    assert!(result.passed);
}
