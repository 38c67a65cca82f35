//! Fault kinds and rules

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pattern::UrlPattern;

/// Synthetic response body for injected HTTP errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "snake_case")]
pub enum FaultBody {
    /// JSON payload
    Json(serde_json::Value),
    /// Plain text payload
    Text(String),
    /// HTML payload
    Html(String),
}

impl FaultBody {
    /// MIME type for the body
    pub fn content_type(&self) -> &'static str {
        match self {
            FaultBody::Json(_) => "application/json",
            FaultBody::Text(_) => "text/plain",
            FaultBody::Html(_) => "text/html",
        }
    }

    /// Render the body as a string
    pub fn render(&self) -> String {
        match self {
            FaultBody::Json(value) => value.to_string(),
            FaultBody::Text(text) => text.clone(),
            FaultBody::Html(html) => html.clone(),
        }
    }
}

impl Default for FaultBody {
    fn default() -> Self {
        FaultBody::Json(serde_json::json!({ "error": "injected failure" }))
    }
}

/// Fault behavior, one variant per failure mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FaultKind {
    /// Requests resolve as a zero-status network failure for the given
    /// duration, then the rule auto-clears
    Disconnect {
        #[serde(with = "humantime_serde")]
        duration: Duration,
    },

    /// Response is delayed before returning the normal success body
    Slow {
        #[serde(with = "humantime_serde")]
        latency: Duration,
    },

    /// Each request independently fails with the given probability
    Intermittent { failure_probability: f64 },

    /// Every request fails with a distinct resolution-failure error
    Dns,

    /// Returns a configurable status and body, optionally delayed
    HttpError {
        status: u16,
        #[serde(default)]
        body: FaultBody,
        #[serde(default, with = "humantime_serde::option")]
        delay: Option<Duration>,
    },

    /// Response hangs for at least the given duration, simulating a
    /// server that never answers within the caller's timeout
    Timeout {
        #[serde(with = "humantime_serde")]
        hang: Duration,
    },

    /// Sliding-window counter per pattern; requests beyond `limit`
    /// within `window` return 429 with a retry-after hint
    RateLimit {
        limit: u32,
        #[serde(with = "humantime_serde")]
        window: Duration,
        #[serde(default = "default_retry_after")]
        retry_after_secs: u64,
    },

    /// With the given probability, delay then return 503; else succeed
    Overload {
        failure_probability: f64,
        #[serde(default, with = "humantime_serde::option")]
        delay: Option<Duration>,
    },
}

fn default_retry_after() -> u64 {
    1
}

impl FaultKind {
    /// Short name used in logs and chaos selection
    pub fn name(&self) -> &'static str {
        match self {
            FaultKind::Disconnect { .. } => "disconnect",
            FaultKind::Slow { .. } => "slow",
            FaultKind::Intermittent { .. } => "intermittent",
            FaultKind::Dns => "dns",
            FaultKind::HttpError { .. } => "http_error",
            FaultKind::Timeout { .. } => "timeout",
            FaultKind::RateLimit { .. } => "rate_limit",
            FaultKind::Overload { .. } => "overload",
        }
    }

    /// Lifetime after which a rule carrying this kind auto-clears, if
    /// the kind is inherently time-bounded
    pub fn auto_expiry(&self) -> Option<Duration> {
        match self {
            FaultKind::Disconnect { duration } => Some(*duration),
            _ => None,
        }
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A fault bound to an endpoint pattern.
///
/// The last rule registered for a pattern replaces any earlier one for
/// the same pattern (overwrite, not merge). `ttl` bounds the rule's
/// lifetime regardless of kind; kinds with inherent expiry (disconnect)
/// expire on their own duration when no `ttl` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultRule {
    pub pattern: UrlPattern,
    pub kind: FaultKind,
    #[serde(default, with = "humantime_serde::option")]
    pub ttl: Option<Duration>,
}

impl FaultRule {
    /// Create a rule without an explicit lifetime
    pub fn new(pattern: impl Into<UrlPattern>, kind: FaultKind) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            ttl: None,
        }
    }

    /// Bound the rule's lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Effective lifetime: explicit `ttl`, else the kind's own expiry
    pub fn effective_ttl(&self) -> Option<Duration> {
        self.ttl.or_else(|| self.kind.auto_expiry())
    }
}
