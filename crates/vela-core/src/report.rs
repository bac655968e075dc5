//! Final result of a wait call.

use std::time::Duration;

use serde::Serialize;

use crate::error::{PolicyFailure, Result, WaitError};
use crate::types::{PolicyKey, PolicyOutcome, WaitId};

/// Terminal outcome of every declared policy, in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    /// Wait call identifier.
    pub wait_id: WaitId,
    /// One terminal outcome per declared policy.
    pub outcomes: Vec<PolicyOutcome>,
    /// Time from start of polling to the last terminal outcome.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// Whether the safety timer had to cancel the policies.
    pub safety_timer_fired: bool,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl ReadinessReport {
    /// Report for a call with no declared policies.
    #[must_use]
    pub fn empty(wait_id: WaitId) -> Self {
        Self {
            wait_id,
            outcomes: Vec::new(),
            elapsed: Duration::ZERO,
            safety_timer_fired: false,
        }
    }

    /// Returns true if every policy ended passed (vacuously true when empty).
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.outcomes.iter().all(PolicyOutcome::is_passed)
    }

    /// Outcome of the policy `key`.
    #[must_use]
    pub fn outcome(&self, key: &PolicyKey) -> Option<&PolicyOutcome> {
        self.outcomes.iter().find(|o| &o.key == key)
    }

    /// Every failing policy, in declaration order.
    #[must_use]
    pub fn failures(&self) -> Vec<PolicyFailure> {
        self.outcomes
            .iter()
            .filter_map(PolicyFailure::from_outcome)
            .collect()
    }

    /// Converts the report into the caller-facing result.
    ///
    /// # Errors
    /// Returns [`WaitError::PolicyFailed`] listing all failing policies.
    pub fn into_result(self) -> Result<()> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(WaitError::PolicyFailed { failures })
        }
    }
}
