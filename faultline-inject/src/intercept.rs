//! Intercepting client decorator

use crate::client::HttpClient;
use crate::context::{FaultInjectionContext, InjectedFailure, InjectionDecision};
use crate::errors::HttpError;
use crate::types::{HttpRequest, HttpResponse};
use std::collections::HashMap;
use tracing::debug;

/// Wraps a real client and consults the injection context before every
/// request. With an empty context it is a transparent pass-through.
#[derive(Debug, Clone)]
pub struct InterceptingClient<C> {
    inner: C,
    context: FaultInjectionContext,
}

impl<C> InterceptingClient<C> {
    pub fn new(inner: C, context: FaultInjectionContext) -> Self {
        Self { inner, context }
    }

    /// The shared injection context
    pub fn context(&self) -> &FaultInjectionContext {
        &self.context
    }

    /// Unwrap the inner client
    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait::async_trait]
impl<C: HttpClient> HttpClient for InterceptingClient<C> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        match self.context.decide(&request.url) {
            InjectionDecision::Proceed => self.inner.execute(request).await,

            InjectionDecision::DelayThenProceed(delay) => {
                debug!("Delaying {} by {:?}", request.url, delay);
                tokio::time::sleep(delay).await;
                self.inner.execute(request).await
            }

            InjectionDecision::Hang(bound) => {
                debug!("Hanging {} for {:?}", request.url, bound);
                tokio::time::sleep(bound).await;
                Err(HttpError::Disconnected)
            }

            InjectionDecision::Fail(InjectedFailure::Disconnected) => Err(HttpError::Disconnected),

            InjectionDecision::Fail(InjectedFailure::DnsResolution) => {
                Err(HttpError::DnsResolution { url: request.url })
            }

            InjectionDecision::Respond {
                delay,
                status,
                body,
                retry_after_secs,
            } => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }

                let mut headers = HashMap::new();
                headers.insert("content-type".to_string(), body.content_type().to_string());
                if let Some(secs) = retry_after_secs {
                    headers.insert("retry-after".to_string(), secs.to_string());
                }

                Ok(HttpResponse {
                    status,
                    status_text: status_text(status).to_string(),
                    headers,
                    body: body.render(),
                })
            }
        }
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Error",
    }
}
