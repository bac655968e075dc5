//! Per-policy poll loop.
//!
//! # Toyota Way: Genchi Genbutsu (現地現物)
//! Go and see: the poller samples the resource directly on a fixed cadence
//! instead of trusting a pushed status.
//!
//! Each poller emits exactly one terminal [`PolicyOutcome`]. The loop lives in
//! [`Poller::poll_until_terminal`], which can only return a terminal outcome;
//! [`Poller::run`] consumes the poller and sends that outcome once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::check::Check;
use crate::duration::MAX_DURATION;
use crate::guard::CancelSignal;
use crate::types::{PolicyKey, PolicyOutcome};

/// Number of probes a timeout window is divided into.
pub const TICKS_PER_TIMEOUT: u32 = 200;

/// Lower bound on the probe interval.
pub const MIN_TICK: Duration = Duration::from_millis(100);

/// Upper bound on the probe interval: the tick of the longest parseable timeout.
pub const MAX_TICK: Duration =
    Duration::from_secs(MAX_DURATION.as_secs() / TICKS_PER_TIMEOUT as u64);

/// Probe interval for a policy with the given timeout.
///
/// `timeout / 200`, clamped to `[MIN_TICK, MAX_TICK]`.
#[must_use]
pub fn tick_interval(timeout: Duration) -> Duration {
    (timeout / TICKS_PER_TIMEOUT).clamp(MIN_TICK, MAX_TICK)
}

/// Background loop driving one policy to a terminal outcome.
pub struct Poller {
    key: PolicyKey,
    check: Arc<dyn Check>,
    timeout: Duration,
    tick: Duration,
    signal: CancelSignal,
}

impl Poller {
    /// Creates a poller for `key`.
    #[must_use]
    pub fn new(
        key: PolicyKey,
        check: Arc<dyn Check>,
        timeout: Duration,
        signal: CancelSignal,
    ) -> Self {
        Self {
            key,
            check,
            timeout,
            tick: tick_interval(timeout),
            signal,
        }
    }

    /// Policy key.
    #[must_use]
    pub fn key(&self) -> &PolicyKey {
        &self.key
    }

    /// Probe interval.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Runs the loop and sends its terminal outcome on `outcomes`.
    pub async fn run(mut self, outcomes: mpsc::Sender<PolicyOutcome>) {
        let outcome = self.poll_until_terminal().await;
        tracing::info!(key = %self.key, outcome = %outcome, "policy reached terminal state");
        if outcomes.send(outcome).await.is_err() {
            tracing::warn!(key = %self.key, "outcome receiver gone before terminal outcome was delivered");
        }
    }

    /// Probes until a terminal outcome is reached.
    ///
    /// Order per iteration: probe and classify, then cancellation, then the
    /// deadline, then sleep one tick. The probe and the sleep are both cut
    /// short by cancellation. A timeout too large to form an `Instant` means
    /// no deadline; the safety timer still applies.
    pub async fn poll_until_terminal(&mut self) -> PolicyOutcome {
        let deadline = Instant::now().checked_add(self.timeout);
        tracing::debug!(
            key = %self.key,
            timeout = %humantime::format_duration(self.timeout),
            tick_ms = self.tick.as_millis() as u64,
            "poller started"
        );

        loop {
            let outcome = tokio::select! {
                biased;
                reason = self.signal.cancelled() => {
                    return PolicyOutcome::canceled(self.key.clone(), reason);
                }
                outcome = self.check.check(&self.key) => outcome,
            };

            if outcome.is_terminal() {
                return outcome;
            }
            tracing::debug!(key = %self.key, detail = %outcome.detail, "still checking");

            if let Some(reason) = self.signal.reason() {
                return PolicyOutcome::canceled(self.key.clone(), reason);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::info!(key = %self.key, "policy timeout elapsed");
                return PolicyOutcome::timed_out(self.key.clone(), format!("timeout-{}", self.key));
            }

            tokio::select! {
                biased;
                reason = self.signal.cancelled() => {
                    return PolicyOutcome::canceled(self.key.clone(), reason);
                }
                () = tokio::time::sleep(self.tick) => {}
            }
        }
    }
}
