//! Chaos run lifecycle

use crate::options::{ChaosError, ChaosOptions};
use faultline_core::{FaultKind, FaultRule, UrlPattern};
use faultline_inject::FaultInjectionContext;
use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::Rng;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct ChaosRun {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Drives randomized fault activation against a shared injection
/// context.
///
/// Idle until [`inject_random_failures`](Self::inject_random_failures)
/// starts a run; returns to idle when the run's duration elapses or
/// [`stop`](Self::stop) is called. Starting a new run while one is
/// active stops the previous run first (last-writer-wins).
pub struct ChaosOrchestrator {
    context: FaultInjectionContext,
    run: Mutex<Option<ChaosRun>>,
}

impl ChaosOrchestrator {
    pub fn new(context: FaultInjectionContext) -> Self {
        Self {
            context,
            run: Mutex::new(None),
        }
    }

    /// The injection context this orchestrator activates faults on
    pub fn context(&self) -> &FaultInjectionContext {
        &self.context
    }

    /// Whether a run is currently active
    pub fn is_active(&self) -> bool {
        self.run
            .lock()
            .as_ref()
            .map(|run| !run.handle.is_finished())
            .unwrap_or(false)
    }

    /// Start a chaos run over the given endpoint patterns.
    ///
    /// One trial executes immediately so a fully deterministic run
    /// (`failure_rate = 1.0`) affects requests issued right after this
    /// returns; further trials fire on a fixed one-second tick until
    /// the duration elapses.
    pub async fn inject_random_failures(
        &self,
        endpoints: Vec<UrlPattern>,
        options: ChaosOptions,
    ) -> Result<(), ChaosError> {
        if endpoints.is_empty() {
            return Err(ChaosError::NoEndpoints);
        }
        options.validate()?;

        // Last-writer-wins: a run already in flight is stopped and its
        // faults cleared before the new one begins.
        self.stop().await;

        info!(
            "Starting chaos run: {} endpoint(s), {} fault kind(s), rate {}, duration {:?}",
            endpoints.len(),
            options.fault_kinds.len(),
            options.failure_rate,
            options.duration
        );

        trial(&self.context, &endpoints, &options);

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let context = self.context.clone();
        let handle = tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + options.duration;
            let mut ticks = tokio::time::interval_at(
                tokio::time::Instant::now() + Duration::from_secs(1),
                Duration::from_secs(1),
            );
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            debug!("Chaos run cancelled");
                            break;
                        }
                    }
                    _ = tokio::time::sleep_until(deadline) => {
                        info!("Chaos run duration elapsed");
                        break;
                    }
                    _ = ticks.tick() => {
                        trial(&context, &endpoints, &options);
                    }
                }
            }

            context.clear_all();
        });

        *self.run.lock() = Some(ChaosRun { stop_tx, handle });
        Ok(())
    }

    /// Stop any active run and clear all faults.
    ///
    /// Idempotent; safe to call before any run was started. The run
    /// task is awaited before faults are cleared, so no stale tick can
    /// re-activate cleared state.
    pub async fn stop(&self) {
        let run = self.run.lock().take();

        if let Some(run) = run {
            if run.stop_tx.send(true).is_err() {
                debug!("Chaos run already finished");
            }
            if let Err(e) = run.handle.await {
                warn!("Chaos run task failed: {}", e);
            }
        }

        self.context.clear_all();
    }
}

/// One random trial: with probability `failure_rate`, pick an endpoint
/// and a fault kind uniformly and activate the pair
fn trial(context: &FaultInjectionContext, endpoints: &[UrlPattern], options: &ChaosOptions) {
    let mut rng = rand::rng();
    if !rng.random_bool(options.failure_rate) {
        return;
    }

    let endpoint = &endpoints[rng.random_range(0..endpoints.len())];
    let kind: FaultKind = options.fault_kinds[rng.random_range(0..options.fault_kinds.len())].clone();

    debug!("Chaos trial: {} on {}", kind, endpoint);
    context.activate(FaultRule::new(endpoint.clone(), kind));
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_inject::{InjectionDecision, InjectedFailure};

    fn dns_only(duration: Duration) -> ChaosOptions {
        ChaosOptions {
            failure_rate: 1.0,
            fault_kinds: vec![FaultKind::Dns],
            duration,
        }
    }

    #[tokio::test]
    async fn test_deterministic_failure_rate_applies_immediately() {
        let orchestrator = ChaosOrchestrator::new(FaultInjectionContext::new());

        orchestrator
            .inject_random_failures(
                vec![UrlPattern::new("/api/courses")],
                dns_only(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        // failure_rate 1.0 guarantees the first trial activated a rule
        // before inject_random_failures returned.
        assert_eq!(
            orchestrator.context().decide("/api/courses"),
            InjectionDecision::Fail(InjectedFailure::DnsResolution)
        );
        assert!(orchestrator.is_active());

        orchestrator.stop().await;
    }

    #[tokio::test]
    async fn test_stop_clears_faults_and_is_idempotent() {
        let orchestrator = ChaosOrchestrator::new(FaultInjectionContext::new());

        // Safe before any run
        orchestrator.stop().await;

        orchestrator
            .inject_random_failures(
                vec![UrlPattern::new("/api/**")],
                dns_only(Duration::from_secs(60)),
            )
            .await
            .unwrap();
        assert!(!orchestrator.context().active_rules().is_empty());

        orchestrator.stop().await;
        assert!(orchestrator.context().active_rules().is_empty());
        assert!(!orchestrator.is_active());
        assert_eq!(
            orchestrator.context().decide("/api/courses"),
            InjectionDecision::Proceed
        );

        // Safe to call again
        orchestrator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_expires_after_duration() {
        let orchestrator = ChaosOrchestrator::new(FaultInjectionContext::new());

        orchestrator
            .inject_random_failures(
                vec![UrlPattern::new("/api/**")],
                dns_only(Duration::from_secs(3)),
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;
        // Give the run task a chance to observe its deadline.
        tokio::task::yield_now().await;

        assert!(!orchestrator.is_active());
        assert!(orchestrator.context().active_rules().is_empty());
        assert_eq!(
            orchestrator.context().decide("/api/courses"),
            InjectionDecision::Proceed
        );
    }

    #[tokio::test]
    async fn test_restart_is_last_writer_wins() {
        let orchestrator = ChaosOrchestrator::new(FaultInjectionContext::new());

        orchestrator
            .inject_random_failures(
                vec![UrlPattern::new("/api/a")],
                dns_only(Duration::from_secs(60)),
            )
            .await
            .unwrap();

        let http_error = ChaosOptions {
            failure_rate: 1.0,
            fault_kinds: vec![FaultKind::HttpError {
                status: 503,
                body: Default::default(),
                delay: None,
            }],
            duration: Duration::from_secs(60),
        };
        orchestrator
            .inject_random_failures(vec![UrlPattern::new("/api/b")], http_error)
            .await
            .unwrap();

        // The first run's faults were cleared when it was stopped.
        assert_eq!(orchestrator.context().decide("/api/a"), InjectionDecision::Proceed);
        assert!(matches!(
            orchestrator.context().decide("/api/b"),
            InjectionDecision::Respond { status: 503, .. }
        ));

        orchestrator.stop().await;
    }

    #[tokio::test]
    async fn test_zero_rate_never_activates() {
        let orchestrator = ChaosOrchestrator::new(FaultInjectionContext::new());

        let options = ChaosOptions {
            failure_rate: 0.0,
            fault_kinds: vec![FaultKind::Dns],
            duration: Duration::from_secs(5),
        };
        orchestrator
            .inject_random_failures(vec![UrlPattern::new("/api/**")], options)
            .await
            .unwrap();

        assert!(orchestrator.context().active_rules().is_empty());
        orchestrator.stop().await;
    }

    #[tokio::test]
    async fn test_empty_endpoints_rejected() {
        let orchestrator = ChaosOrchestrator::new(FaultInjectionContext::new());
        let result = orchestrator
            .inject_random_failures(Vec::new(), ChaosOptions::default())
            .await;
        assert!(matches!(result, Err(ChaosError::NoEndpoints)));
    }
}
