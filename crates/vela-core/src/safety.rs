//! Global safety timer.
//!
//! Outer bound on a wait call: if some poller fails to honour its own
//! timeout, every policy is canceled once the longest timeout plus a fixed
//! buffer has passed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::guard::CancellationGuard;

/// Reason delivered to every guard when the safety timer fires.
pub const SAFETY_TIMEOUT_REASON: &str = "Uber-Timeout";

/// Default slack added to the longest policy timeout.
pub const DEFAULT_SAFETY_BUFFER: Duration = Duration::from_secs(2);

/// Armed safety timer; aborted on [`SafetyTimer::disarm`] or drop.
#[derive(Debug)]
pub struct SafetyTimer {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
    after: Duration,
}

impl SafetyTimer {
    /// `max(timeouts) + buffer`.
    #[must_use]
    pub fn deadline(timeouts: impl IntoIterator<Item = Duration>, buffer: Duration) -> Duration {
        timeouts.into_iter().max().unwrap_or_default().saturating_add(buffer)
    }

    /// Spawns a timer that cancels every guard after `after`.
    #[must_use]
    pub fn arm(after: Duration, guards: Vec<CancellationGuard>) -> Self {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            flag.store(true, Ordering::SeqCst);
            tracing::warn!(
                after = %humantime::format_duration(after),
                policies = guards.len(),
                "safety timeout, canceling all creation policy checks"
            );
            for guard in &guards {
                guard.cancel(SAFETY_TIMEOUT_REASON);
            }
        });
        Self {
            handle,
            fired,
            after,
        }
    }

    /// Delay the timer was armed with.
    #[must_use]
    pub const fn after(&self) -> Duration {
        self.after
    }

    /// Returns true if the timer has fired.
    #[must_use]
    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Stops the timer; returns whether it had already fired.
    pub fn disarm(self) -> bool {
        self.handle.abort();
        self.fired()
    }
}

impl Drop for SafetyTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
