//! Outcome fan-in.
//!
//! # Toyota Way: Jidoka (自働化)
//! Stop the line: the first failing policy cancels all of its siblings.
//!
//! The aggregator is the only writer of outcome state. It owns the outcome
//! map while running and hands it back when every policy is terminal.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::guard::CancellationGuard;
use crate::policy::PolicyInstance;
use crate::types::{PolicyKey, PolicyOutcome};

/// Single consumer of poller outcomes.
#[derive(Debug)]
pub struct Aggregator {
    outcomes: HashMap<PolicyKey, PolicyOutcome>,
    guards: Vec<(PolicyKey, CancellationGuard)>,
    pending: usize,
}

impl Aggregator {
    /// Creates an aggregator tracking `instances`, all initially `Checking`.
    #[must_use]
    pub fn new(instances: &[PolicyInstance]) -> Self {
        let outcomes = instances
            .iter()
            .map(|i| (i.key().clone(), PolicyOutcome::checking(i.key().clone(), "")))
            .collect();
        let guards = instances
            .iter()
            .map(|i| (i.key().clone(), i.guard().clone()))
            .collect();
        Self {
            outcomes,
            guards,
            pending: instances.len(),
        }
    }

    /// Policies not yet terminal.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.pending
    }

    /// Latest recorded outcome for `key`.
    #[must_use]
    pub fn outcome(&self, key: &PolicyKey) -> Option<&PolicyOutcome> {
        self.outcomes.get(key)
    }

    /// Records one outcome.
    ///
    /// Terminal records are never overwritten. A failure cancels every other
    /// policy before this returns. Returns true if `outcome` completed its policy.
    pub fn record(&mut self, outcome: PolicyOutcome) -> bool {
        let Some(current) = self.outcomes.get_mut(&outcome.key) else {
            tracing::warn!(key = %outcome.key, "outcome for unknown creation policy ignored");
            return false;
        };
        if current.is_terminal() {
            tracing::warn!(
                key = %outcome.key,
                recorded = %current,
                ignored = %outcome,
                "creation policy already terminal, outcome ignored"
            );
            return false;
        }

        *current = outcome.clone();

        if outcome.is_failure() {
            tracing::warn!(outcome = %outcome, "creation policy failed");
            self.cancel_siblings(&outcome);
        }
        if outcome.is_terminal() {
            self.pending -= 1;
            tracing::info!(outcome = %outcome, pending = self.pending, "done amid terminal state");
            return true;
        }
        false
    }

    fn cancel_siblings(&self, failed: &PolicyOutcome) {
        let reason = format!(
            "canceled because {} has failed: state {}",
            failed.key, failed.state
        );
        for (key, guard) in &self.guards {
            if *key == failed.key {
                continue;
            }
            if guard.cancel(reason.clone()) {
                tracing::debug!(key = %key, cause = %failed.key, "canceled sibling policy");
            }
        }
    }

    /// Consumes outcomes until every policy is terminal.
    ///
    /// Also stops if every sender is dropped; the map then still holds
    /// non-terminal records, which the caller must treat as a bug.
    pub async fn run(mut self, mut outcomes: mpsc::Receiver<PolicyOutcome>) -> HashMap<PolicyKey, PolicyOutcome> {
        while self.pending > 0 {
            match outcomes.recv().await {
                Some(outcome) => {
                    self.record(outcome);
                }
                None => {
                    tracing::error!(
                        pending = self.pending,
                        "outcome channel closed before all creation policies were terminal"
                    );
                    break;
                }
            }
        }
        self.outcomes
    }
}
