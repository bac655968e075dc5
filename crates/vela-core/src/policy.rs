//! A configured creation policy, ready to be started.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::check::Check;
use crate::guard::CancellationGuard;
use crate::poller::Poller;
use crate::types::{PolicyKey, PolicyOutcome};

/// One policy of one wait call.
///
/// Owns its cancellation guard and its (not yet started) poller. Created by a
/// registry constructor and owned by the waiter for the duration of the call.
pub struct PolicyInstance {
    key: PolicyKey,
    policy_type: String,
    timeout: Duration,
    guard: CancellationGuard,
    poller: Option<Poller>,
}

impl PolicyInstance {
    /// Creates an instance polling `check` until `timeout`.
    #[must_use]
    pub fn new(
        key: PolicyKey,
        policy_type: impl Into<String>,
        timeout: Duration,
        check: Arc<dyn Check>,
    ) -> Self {
        let (guard, signal) = CancellationGuard::new();
        let poller = Poller::new(key.clone(), check, timeout, signal);
        Self {
            key,
            policy_type: policy_type.into(),
            timeout,
            guard,
            poller: Some(poller),
        }
    }

    /// Policy key.
    #[must_use]
    pub fn key(&self) -> &PolicyKey {
        &self.key
    }

    /// Registered type name.
    #[must_use]
    pub fn policy_type(&self) -> &str {
        &self.policy_type
    }

    /// Per-policy timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// This policy's cancellation guard.
    #[must_use]
    pub fn guard(&self) -> &CancellationGuard {
        &self.guard
    }

    /// Returns true until [`PolicyInstance::start`] has been called.
    #[must_use]
    pub fn is_pending_start(&self) -> bool {
        self.poller.is_some()
    }

    /// Spawns the poller, which will send one terminal outcome on `outcomes`.
    ///
    /// Returns `None` if already started.
    pub fn start(&mut self, outcomes: mpsc::Sender<PolicyOutcome>) -> Option<JoinHandle<()>> {
        let poller = self.poller.take()?;
        let span = tracing::info_span!(
            "policy",
            key = %self.key,
            policy_type = %self.policy_type,
        );
        Some(tokio::spawn(poller.run(outcomes).instrument(span)))
    }
}

impl fmt::Debug for PolicyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyInstance")
            .field("key", &self.key)
            .field("policy_type", &self.policy_type)
            .field("timeout", &self.timeout)
            .field("started", &self.poller.is_none())
            .finish_non_exhaustive()
    }
}
