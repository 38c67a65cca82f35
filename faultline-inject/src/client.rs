//! HTTP client abstraction and reqwest-backed implementation

use crate::errors::HttpError;
use crate::types::{HttpRequest, HttpResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client trait; the application under test issues all outgoing
/// calls through this boundary so decorators can observe or intercept
/// them
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Real client backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        debug!("Sending {} request to {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.into(), request.url.as_str());

        if !request.headers.is_empty() {
            let mut header_map = HeaderMap::new();
            for (name, value) in &request.headers {
                let Ok(header_name) = HeaderName::from_str(name) else {
                    warn!("Skipping invalid header name: {}", name);
                    continue;
                };
                if let Ok(header_value) = HeaderValue::from_str(value) {
                    header_map.insert(header_name, header_value);
                }
            }
            builder = builder.headers(header_map);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("Unknown Status").to_string();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        debug!("Received {} ({} bytes)", status.as_u16(), body.len());

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}
