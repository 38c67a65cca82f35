//! End-to-end fault injection behavior through the client stack

use faultline_core::{FaultBody, FaultKind, FaultRule};
use faultline_inject::{
    FaultInjectionContext, HttpClient, HttpError, HttpRequest, HttpResponse, InjectionDecision,
    InterceptingClient,
};
use std::collections::HashMap;
use std::time::Duration;

/// Inner client that always answers 200
struct OkClient;

#[async_trait::async_trait]
impl HttpClient for OkClient {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, HttpError> {
        Ok(HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: HashMap::new(),
            body: r#"{"ok":true}"#.to_string(),
        })
    }
}

fn client_with_context() -> (InterceptingClient<OkClient>, FaultInjectionContext) {
    let context = FaultInjectionContext::new();
    (InterceptingClient::new(OkClient, context.clone()), context)
}

#[test]
fn test_intermittent_failure_rate_converges() {
    let context = FaultInjectionContext::new();
    context.activate(FaultRule::new(
        "/api/flaky",
        FaultKind::Intermittent {
            failure_probability: 0.3,
        },
    ));

    let trials = 4000;
    let failures = (0..trials)
        .filter(|_| matches!(context.decide("/api/flaky"), InjectionDecision::Fail(_)))
        .count();

    let observed = failures as f64 / trials as f64;
    // Bernoulli(0.3) over 4000 trials: five sigma is well under 0.05
    assert!(
        (observed - 0.3).abs() < 0.05,
        "observed failure rate {} too far from 0.3",
        observed
    );
}

#[tokio::test]
async fn test_clear_all_after_mixed_faults_restores_every_endpoint() {
    let (client, context) = client_with_context();

    context.activate(FaultRule::new("/api/**", FaultKind::Dns));
    context.activate(FaultRule::new(
        "/auth/*",
        FaultKind::Disconnect {
            duration: Duration::from_secs(60),
        },
    ));
    context.activate(FaultRule::new(
        "/media/*",
        FaultKind::RateLimit {
            limit: 1,
            window: Duration::from_secs(60),
            retry_after_secs: 1,
        },
    ));
    context.activate(FaultRule::new(
        "/search",
        FaultKind::HttpError {
            status: 503,
            body: FaultBody::default(),
            delay: None,
        },
    ));

    context.clear_all();

    // No leaked interception: every request on every previously
    // faulted endpoint succeeds normally.
    for url in ["/api/courses", "/auth/login", "/media/video-1", "/search"] {
        for _ in 0..25 {
            let response = client.execute(HttpRequest::get(url)).await.unwrap();
            assert_eq!(response.status, 200, "leaked fault on {}", url);
        }
    }
}

#[tokio::test]
async fn test_rate_limit_window_rolls_over() {
    let (client, context) = client_with_context();
    let window = Duration::from_millis(200);
    context.activate(FaultRule::new(
        "/api/list",
        FaultKind::RateLimit {
            limit: 3,
            window,
            retry_after_secs: 1,
        },
    ));

    // First L requests pass, the (L+1)-th within the window is limited
    for _ in 0..3 {
        let response = client.execute(HttpRequest::get("/api/list")).await.unwrap();
        assert_eq!(response.status, 200);
    }
    let limited = client.execute(HttpRequest::get("/api/list")).await.unwrap();
    assert_eq!(limited.status, 429);
    assert_eq!(limited.retry_after(), Some(1));

    // Once the window has elapsed since the first request, the counter
    // has reset and the next request succeeds.
    tokio::time::sleep(window + Duration::from_millis(50)).await;
    let response = client.execute(HttpRequest::get("/api/list")).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_dns_and_disconnect_are_distinguishable() {
    let (client, context) = client_with_context();

    context.activate(FaultRule::new("/api/dns", FaultKind::Dns));
    context.activate(FaultRule::new(
        "/api/drop",
        FaultKind::Disconnect {
            duration: Duration::from_secs(60),
        },
    ));

    match client.execute(HttpRequest::get("/api/dns")).await {
        Err(error @ HttpError::DnsResolution { .. }) => assert!(error.is_injected()),
        other => panic!("expected DNS resolution failure, got {:?}", other),
    }

    match client.execute(HttpRequest::get("/api/drop")).await {
        Err(error @ HttpError::Disconnected) => assert!(error.is_injected()),
        other => panic!("expected disconnect, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_fault_delays_by_configured_latency() {
    let (client, context) = client_with_context();
    context.activate(FaultRule::new(
        "/api/slow",
        FaultKind::Slow {
            latency: Duration::from_secs(3),
        },
    ));

    let started = tokio::time::Instant::now();
    let response = client.execute(HttpRequest::get("/api/slow")).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn test_disconnect_auto_clears_after_duration() {
    let (client, context) = client_with_context();
    context.activate(FaultRule::new(
        "/api/courses",
        FaultKind::Disconnect {
            duration: Duration::from_millis(80),
        },
    ));

    assert!(client.execute(HttpRequest::get("/api/courses")).await.is_err());

    tokio::time::sleep(Duration::from_millis(150)).await;
    let response = client.execute(HttpRequest::get("/api/courses")).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(context.active_rules().is_empty());
}

#[tokio::test]
async fn test_overload_at_certainty_returns_503() {
    let (client, context) = client_with_context();
    context.activate(FaultRule::new(
        "/api/busy",
        FaultKind::Overload {
            failure_probability: 1.0,
            delay: None,
        },
    ));

    let response = client.execute(HttpRequest::get("/api/busy")).await.unwrap();
    assert_eq!(response.status, 503);
}
