//! HTTP error types

use crate::types::HttpMethodError;

/// Error type for HTTP operations.
///
/// Injected network-level faults map to dedicated variants so tests
/// can assert on the exact failure mode; injected HTTP errors (429,
/// 503, configured statuses) come back as ordinary responses instead.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Transport-level failure from the real client
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Connection dropped with no response (injected disconnect, or a
    /// hang that outlived its bound)
    #[error("Connection dropped before a response was received")]
    Disconnected,

    /// Name resolution failed, distinct from a generic disconnect
    #[error("DNS resolution failed for {url}")]
    DnsResolution { url: String },

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] HttpMethodError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl HttpError {
    /// Whether this error was synthesized by the injector rather than
    /// produced by real transport
    pub fn is_injected(&self) -> bool {
        matches!(self, HttpError::Disconnected | HttpError::DnsResolution { .. })
    }
}
