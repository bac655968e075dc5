//! Single-fire cancellation.
//!
//! A [`CancellationGuard`] and its [`CancelSignal`] share one
//! `watch` slot holding `Option<String>`. The slot is written with
//! `send_if_modified` while still empty, so exactly one caller ever
//! delivers a reason no matter how many race to cancel.

use std::sync::Arc;

use tokio::sync::watch;

/// Write side of a policy's cancellation slot.
///
/// Cheap to clone; all clones share the same slot.
#[derive(Debug, Clone)]
pub struct CancellationGuard {
    tx: Arc<watch::Sender<Option<String>>>,
}

/// Read side handed to the policy's poller.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<Option<String>>,
}

impl CancellationGuard {
    /// Creates a fresh guard and its paired signal.
    #[must_use]
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(None);
        (Self { tx: Arc::new(tx) }, CancelSignal { rx })
    }

    /// Delivers `reason` if nobody has canceled yet.
    ///
    /// Returns true only for the call that actually delivered. Later calls
    /// are silent no-ops.
    pub fn cancel(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(reason);
            true
        })
    }

    /// Returns true once any caller has canceled.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Returns the delivered reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.tx.borrow().clone()
    }
}

impl CancelSignal {
    /// Non-blocking check; returns the reason if canceled.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.rx.borrow().clone()
    }

    /// Waits until canceled and returns the reason.
    ///
    /// Pends forever if every guard is dropped without canceling.
    pub async fn cancelled(&mut self) -> String {
        let reason = match self.rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        match reason {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    }
}
