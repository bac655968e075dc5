//! Readiness waiter - orchestrates one wait call.
//!
//! # Toyota Way: Heijunka (平準化)
//! Every policy gets its own task, so a slow probe never holds up its
//! siblings.
//!
//! Flow of [`ReadinessWaiter::wait_with_report`]:
//!
//! ```text
//! specs ─→ registry ─→ N PolicyInstance
//!                        │ start
//!                        ▼
//!            N Poller ──outcome──→ Aggregator ──cancel──→ siblings
//!                                      │ all terminal
//!            SafetyTimer (max+buffer)  ▼
//!                                   report
//! ```

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::Instrument;

use crate::aggregator::Aggregator;
use crate::check::Target;
use crate::config::{PolicySpec, WaitConfig};
use crate::error::{Result, WaitError};
use crate::policy::PolicyInstance;
use crate::registry::PolicyRegistry;
use crate::report::ReadinessReport;
use crate::safety::{DEFAULT_SAFETY_BUFFER, SafetyTimer};
use crate::types::{PolicyKey, WaitId};

/// Blocks until every declared creation policy is terminal.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessWaiter<'r> {
    registry: &'r PolicyRegistry,
    safety_buffer: Duration,
}

impl<'r> ReadinessWaiter<'r> {
    /// Creates a waiter resolving policy types through `registry`.
    #[must_use]
    pub const fn new(registry: &'r PolicyRegistry) -> Self {
        Self {
            registry,
            safety_buffer: DEFAULT_SAFETY_BUFFER,
        }
    }

    /// Sets the slack added to the longest timeout for the safety timer.
    #[must_use]
    pub const fn with_safety_buffer(mut self, buffer: Duration) -> Self {
        self.safety_buffer = buffer;
        self
    }

    /// Applies engine tuning from `config`.
    #[must_use]
    pub const fn with_config(self, config: &WaitConfig) -> Self {
        self.with_safety_buffer(config.safety_buffer)
    }

    /// Safety buffer in use.
    #[must_use]
    pub const fn safety_buffer(&self) -> Duration {
        self.safety_buffer
    }

    /// Builds one instance per declaration, in order.
    ///
    /// # Errors
    /// Returns a configuration error for a missing or unknown type, a
    /// duplicate key, or anything the type's constructor rejects. Nothing is
    /// started.
    pub fn build_policies(&self, specs: &[PolicySpec], target: &Target) -> Result<Vec<PolicyInstance>> {
        let mut seen = HashSet::with_capacity(specs.len());
        let mut instances = Vec::with_capacity(specs.len());

        for (index, spec) in specs.iter().enumerate() {
            if spec.policy_type.trim().is_empty() {
                return Err(WaitError::config(format!(
                    "creation policy #{index}: type must be specified"
                )));
            }
            let key = PolicyKey::indexed(&spec.policy_type, index);
            if !seen.insert(key.clone()) {
                return Err(WaitError::Config(format!(
                    "duplicate creation policy key {key}"
                )));
            }
            instances.push(self.registry.build(&key, target, spec)?);
        }
        Ok(instances)
    }

    /// Waits for every policy in `specs` and reduces the result to pass/fail.
    ///
    /// # Errors
    /// See [`ReadinessWaiter::wait_with_report`]; additionally returns
    /// [`WaitError::PolicyFailed`] if any policy did not pass.
    pub async fn wait_for_policies(&self, specs: &[PolicySpec], target: &Target) -> Result<()> {
        self.wait_with_report(specs, target).await?.into_result()
    }

    /// Waits for every policy in `specs` and returns all terminal outcomes.
    ///
    /// An empty `specs` is vacuously ready.
    ///
    /// # Errors
    /// Returns a configuration error before anything starts, or
    /// [`WaitError::Internal`] if a policy is still non-terminal after the
    /// join.
    pub async fn wait_with_report(&self, specs: &[PolicySpec], target: &Target) -> Result<ReadinessReport> {
        let wait_id = WaitId::new();
        let span = tracing::info_span!("wait", wait_id = %wait_id, resource = %target.name());
        self.run(wait_id, specs, target).instrument(span).await
    }

    async fn run(&self, wait_id: WaitId, specs: &[PolicySpec], target: &Target) -> Result<ReadinessReport> {
        if specs.is_empty() {
            tracing::debug!("no creation policies declared");
            return Ok(ReadinessReport::empty(wait_id));
        }

        let mut instances = self.build_policies(specs, target)?;
        tracing::info!(policies = instances.len(), "waiting for creation policies");

        let started = Instant::now();
        let (tx, rx) = mpsc::channel(instances.len());

        let aggregator = Aggregator::new(&instances);
        let aggregator = tokio::spawn(aggregator.run(rx).in_current_span());

        let deadline = SafetyTimer::deadline(instances.iter().map(PolicyInstance::timeout), self.safety_buffer);
        let safety = SafetyTimer::arm(
            deadline,
            instances.iter().map(|i| i.guard().clone()).collect(),
        );

        let pollers: Vec<_> = instances
            .iter_mut()
            .filter_map(|instance| instance.start(tx.clone()))
            .collect();
        drop(tx);

        let joined = aggregator.await;
        let safety_timer_fired = safety.disarm();
        if joined.is_err() {
            for instance in &instances {
                instance.guard().cancel("aggregator failed");
            }
        }

        for poller in pollers {
            if let Err(e) = poller.await {
                tracing::error!(error = %e, "poller task did not finish cleanly");
            }
        }

        let mut outcomes = joined
            .map_err(|e| WaitError::internal(format!("aggregator task failed: {e}")))?;

        let mut ordered = Vec::with_capacity(instances.len());
        for instance in &instances {
            let outcome = outcomes.remove(instance.key()).ok_or_else(|| {
                WaitError::internal(format!("creation policy {} has no outcome", instance.key()))
            })?;
            if !outcome.is_terminal() {
                tracing::error!(outcome = %outcome, "creation policy not terminal after join");
                return Err(WaitError::internal(format!(
                    "creation policy {} expected to be in a terminal state, got {outcome}",
                    instance.key()
                )));
            }
            ordered.push(outcome);
        }

        let report = ReadinessReport {
            wait_id,
            outcomes: ordered,
            elapsed: started.elapsed(),
            safety_timer_fired,
        };
        if report.is_ready() {
            tracing::info!(elapsed_ms = report.elapsed.as_millis() as u64, "all creation policies passed");
        } else {
            tracing::warn!(
                failed = report.failures().len(),
                safety_timer_fired,
                "creation policies not met"
            );
        }
        Ok(report)
    }
}
