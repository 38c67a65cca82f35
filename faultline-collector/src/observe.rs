//! Observing client decorator

use faultline_inject::{HttpClient, HttpError, HttpRequest, HttpResponse};
use std::time::Instant;

use crate::collector::{ApiCall, PerformanceCollector};

/// Wraps a client and feeds every call into a collector: request start
/// to response end, status, and transferred bytes. Failures are
/// recorded and then returned unchanged.
#[derive(Debug, Clone)]
pub struct ObservedClient<C> {
    inner: C,
    collector: PerformanceCollector,
}

impl<C> ObservedClient<C> {
    pub fn new(inner: C, collector: PerformanceCollector) -> Self {
        Self { inner, collector }
    }

    /// The collector receiving observations
    pub fn collector(&self) -> &PerformanceCollector {
        &self.collector
    }
}

#[async_trait::async_trait]
impl<C: HttpClient> HttpClient for ObservedClient<C> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = request.url.clone();
        let started = Instant::now();

        let result = self.inner.execute(request).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let call = match &result {
            Ok(response) => ApiCall {
                url,
                duration_ms,
                status: response.status,
                success: response.is_success(),
                transfer_bytes: response.body.len() as u64,
            },
            Err(_) => ApiCall {
                url,
                duration_ms,
                status: 0,
                success: false,
                transfer_bytes: 0,
            },
        };
        self.collector.record_api_call(call);

        result
    }
}
