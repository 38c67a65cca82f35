//! Fault injection context
//!
//! Owns every piece of interception state: the active rule table and
//! the per-pattern rate-limit windows. Rules expire by deadline,
//! checked at match time, so `clear_all` leaves nothing behind that
//! could re-activate later.

use faultline_core::{FaultBody, FaultKind, FaultRule};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Network-level failure to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Zero-status connection drop
    Disconnected,
    /// Name resolution failure, distinguishable in assertions
    DnsResolution,
}

/// What the interceptor should do with one request
#[derive(Debug, Clone, PartialEq)]
pub enum InjectionDecision {
    /// No matching rule; forward to the real client
    Proceed,
    /// Sleep, then forward normally
    DelayThenProceed(Duration),
    /// Sleep at least this long, then drop the connection; callers
    /// with a shorter timeout observe their own timeout first
    Hang(Duration),
    /// Fail immediately with a network-level error
    Fail(InjectedFailure),
    /// Synthesize a response without touching the real client
    Respond {
        delay: Option<Duration>,
        status: u16,
        body: FaultBody,
        retry_after_secs: Option<u64>,
    },
}

#[derive(Debug)]
struct ActiveRule {
    rule: FaultRule,
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct ContextState {
    /// Insertion-ordered; the last matching rule wins
    rules: Vec<ActiveRule>,
    /// Request timestamps per rate-limited pattern
    windows: HashMap<String, Vec<Instant>>,
}

impl ContextState {
    fn prune_expired(&mut self, now: Instant) {
        let before = self.rules.len();
        self.rules
            .retain(|active| active.expires_at.map(|at| at > now).unwrap_or(true));

        if self.rules.len() != before {
            let live: Vec<&str> = self
                .rules
                .iter()
                .map(|active| active.rule.pattern.as_str())
                .collect();
            self.windows.retain(|pattern, _| live.contains(&pattern.as_str()));
        }
    }
}

/// Explicit, shareable fault-injection state
#[derive(Debug, Clone, Default)]
pub struct FaultInjectionContext {
    inner: Arc<Mutex<ContextState>>,
}

impl FaultInjectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. A rule already registered for the same pattern
    /// is replaced (overwrite, not merge), and the new rule takes the
    /// most-recent position so it wins over earlier overlapping
    /// patterns.
    pub fn activate(&self, rule: FaultRule) {
        let expires_at = rule.effective_ttl().map(|ttl| Instant::now() + ttl);
        let mut state = self.inner.lock();

        state
            .rules
            .retain(|active| active.rule.pattern != rule.pattern);
        state.windows.remove(rule.pattern.as_str());

        info!(
            "Activating {} fault for {} (expires: {})",
            rule.kind,
            rule.pattern,
            expires_at.is_some()
        );
        state.rules.push(ActiveRule { rule, expires_at });
    }

    /// Remove the rule for one pattern; returns whether one existed
    pub fn clear(&self, pattern: &str) -> bool {
        let mut state = self.inner.lock();
        let before = state.rules.len();
        state.rules.retain(|active| active.rule.pattern.as_str() != pattern);
        state.windows.remove(pattern);
        state.rules.len() != before
    }

    /// Drop all rules and rate-limit windows, restoring normal traffic
    pub fn clear_all(&self) {
        let mut state = self.inner.lock();
        let count = state.rules.len();
        state.rules.clear();
        state.windows.clear();
        if count > 0 {
            info!("Cleared {} active fault rule(s)", count);
        }
    }

    /// Currently registered rules, expired ones excluded
    pub fn active_rules(&self) -> Vec<FaultRule> {
        let mut state = self.inner.lock();
        state.prune_expired(Instant::now());
        state.rules.iter().map(|active| active.rule.clone()).collect()
    }

    /// Decide what to do with a request to `url`
    pub fn decide(&self, url: &str) -> InjectionDecision {
        let now = Instant::now();
        let mut state = self.inner.lock();
        state.prune_expired(now);

        let Some(index) = state
            .rules
            .iter()
            .rposition(|active| active.rule.pattern.matches(url))
        else {
            return InjectionDecision::Proceed;
        };

        let kind = state.rules[index].rule.kind.clone();
        let pattern = state.rules[index].rule.pattern.as_str().to_string();

        let decision = match kind {
            FaultKind::Disconnect { .. } => InjectionDecision::Fail(InjectedFailure::Disconnected),

            FaultKind::Slow { latency } => InjectionDecision::DelayThenProceed(latency),

            FaultKind::Intermittent { failure_probability } => {
                let p = failure_probability.clamp(0.0, 1.0);
                if rand::rng().random_bool(p) {
                    InjectionDecision::Fail(InjectedFailure::Disconnected)
                } else {
                    InjectionDecision::Proceed
                }
            }

            FaultKind::Dns => InjectionDecision::Fail(InjectedFailure::DnsResolution),

            FaultKind::HttpError { status, body, delay } => InjectionDecision::Respond {
                delay,
                status,
                body,
                retry_after_secs: None,
            },

            FaultKind::Timeout { hang } => InjectionDecision::Hang(hang),

            FaultKind::RateLimit {
                limit,
                window,
                retry_after_secs,
            } => {
                let cutoff = now - window;
                let timestamps = state.windows.entry(pattern).or_default();
                timestamps.retain(|at| *at > cutoff);
                timestamps.push(now);

                if timestamps.len() as u32 > limit {
                    InjectionDecision::Respond {
                        delay: None,
                        status: 429,
                        body: FaultBody::Json(serde_json::json!({
                            "error": "rate limit exceeded",
                            "retryAfter": retry_after_secs,
                        })),
                        retry_after_secs: Some(retry_after_secs),
                    }
                } else {
                    InjectionDecision::Proceed
                }
            }

            FaultKind::Overload {
                failure_probability,
                delay,
            } => {
                let p = failure_probability.clamp(0.0, 1.0);
                if rand::rng().random_bool(p) {
                    InjectionDecision::Respond {
                        delay,
                        status: 503,
                        body: FaultBody::default(),
                        retry_after_secs: None,
                    }
                } else {
                    InjectionDecision::Proceed
                }
            }
        };

        debug!("Decision for {}: {:?}", url, decision);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn context_with(kind: FaultKind) -> FaultInjectionContext {
        let context = FaultInjectionContext::new();
        context.activate(FaultRule::new("/api/*", kind));
        context
    }

    #[test]
    fn test_no_rule_proceeds() {
        let context = FaultInjectionContext::new();
        assert_eq!(context.decide("/api/courses"), InjectionDecision::Proceed);
    }

    #[test]
    fn test_disconnect_fails_matching_requests_only() {
        let context = context_with(FaultKind::Disconnect {
            duration: Duration::from_secs(60),
        });

        assert_eq!(
            context.decide("/api/courses"),
            InjectionDecision::Fail(InjectedFailure::Disconnected)
        );
        assert_eq!(context.decide("/auth/login"), InjectionDecision::Proceed);
    }

    #[test]
    fn test_disconnect_expires_and_traffic_resumes() {
        let context = context_with(FaultKind::Disconnect {
            duration: Duration::from_millis(30),
        });

        assert!(matches!(
            context.decide("/api/courses"),
            InjectionDecision::Fail(_)
        ));

        thread::sleep(Duration::from_millis(60));
        assert_eq!(context.decide("/api/courses"), InjectionDecision::Proceed);
        assert!(context.active_rules().is_empty());
    }

    #[test]
    fn test_dns_is_distinct_from_disconnect() {
        let context = context_with(FaultKind::Dns);
        assert_eq!(
            context.decide("/api/courses"),
            InjectionDecision::Fail(InjectedFailure::DnsResolution)
        );
    }

    #[test]
    fn test_intermittent_extremes_are_deterministic() {
        let always = context_with(FaultKind::Intermittent {
            failure_probability: 1.0,
        });
        let never = context_with(FaultKind::Intermittent {
            failure_probability: 0.0,
        });

        for _ in 0..50 {
            assert!(matches!(always.decide("/api/x"), InjectionDecision::Fail(_)));
            assert_eq!(never.decide("/api/x"), InjectionDecision::Proceed);
        }
    }

    #[test]
    fn test_rate_limit_window_boundary() {
        let context = context_with(FaultKind::RateLimit {
            limit: 3,
            window: Duration::from_millis(80),
            retry_after_secs: 1,
        });

        for _ in 0..3 {
            assert_eq!(context.decide("/api/list"), InjectionDecision::Proceed);
        }
        match context.decide("/api/list") {
            InjectionDecision::Respond {
                status,
                retry_after_secs,
                ..
            } => {
                assert_eq!(status, 429);
                assert_eq!(retry_after_secs, Some(1));
            }
            other => panic!("expected 429 response, got {:?}", other),
        }

        // Once the window slides past the initial burst the counter
        // resets and requests succeed again.
        thread::sleep(Duration::from_millis(120));
        assert_eq!(context.decide("/api/list"), InjectionDecision::Proceed);
    }

    #[test]
    fn test_last_registered_rule_wins_for_same_pattern() {
        let context = FaultInjectionContext::new();
        context.activate(FaultRule::new("/api/*", FaultKind::Dns));
        context.activate(FaultRule::new(
            "/api/*",
            FaultKind::HttpError {
                status: 500,
                body: FaultBody::default(),
                delay: None,
            },
        ));

        assert_eq!(context.active_rules().len(), 1);
        assert!(matches!(
            context.decide("/api/courses"),
            InjectionDecision::Respond { status: 500, .. }
        ));
    }

    #[test]
    fn test_overlapping_patterns_latest_wins() {
        let context = FaultInjectionContext::new();
        context.activate(FaultRule::new("/api/**", FaultKind::Dns));
        context.activate(FaultRule::new("/api/courses", FaultKind::Disconnect {
            duration: Duration::from_secs(60),
        }));

        assert_eq!(
            context.decide("/api/courses"),
            InjectionDecision::Fail(InjectedFailure::Disconnected)
        );
        // Other endpoints still hit the broader DNS rule
        assert_eq!(
            context.decide("/api/lessons"),
            InjectionDecision::Fail(InjectedFailure::DnsResolution)
        );
    }

    #[test]
    fn test_clear_all_restores_normal_traffic() {
        let context = FaultInjectionContext::new();
        context.activate(FaultRule::new("/api/**", FaultKind::Dns));
        context.activate(FaultRule::new(
            "/auth/*",
            FaultKind::RateLimit {
                limit: 1,
                window: Duration::from_secs(60),
                retry_after_secs: 1,
            },
        ));

        context.clear_all();

        assert!(context.active_rules().is_empty());
        for url in ["/api/courses", "/auth/login", "/auth/logout"] {
            assert_eq!(context.decide(url), InjectionDecision::Proceed);
        }
    }

    #[test]
    fn test_malformed_pattern_matches_nothing() {
        // Unbalanced bracket compiles to a literal; it matches no real
        // endpoint and never panics.
        let context = FaultInjectionContext::new();
        context.activate(FaultRule::new("/api/[broken", FaultKind::Dns));
        assert_eq!(context.decide("/api/courses"), InjectionDecision::Proceed);
    }
}
