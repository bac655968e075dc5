//! Error types for vela-core.
//!
//! Per Iron Lotus Framework: All errors are explicit, no panics allowed.
//! Probe failures are data flowing into a classifier, so they get their own
//! type and never surface as a [`WaitError`] directly.

use std::fmt;

use serde::Serialize;

use crate::types::{PolicyKey, PolicyOutcome, WaitState};

/// Result type alias for wait operations.
pub type Result<T> = std::result::Result<T, WaitError>;

/// Error type for readiness waits.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// Invalid policy declaration; raised before any poller starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// One or more policies ended without passing.
    #[error("creation policy failure: {}", render_failures(.failures))]
    PolicyFailed {
        /// Every non-passing policy, in declaration order.
        failures: Vec<PolicyFailure>,
    },

    /// Internal invariant violated (should not occur in production).
    #[error("internal error: {0}")]
    Internal(String),
}

impl WaitError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true for errors caused by the policy declarations themselves.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this error signals a synchronization bug.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Returns the failing policies, if this is a policy failure.
    #[must_use]
    pub fn failures(&self) -> &[PolicyFailure] {
        match self {
            Self::PolicyFailed { failures } => failures,
            _ => &[],
        }
    }
}

fn render_failures(failures: &[PolicyFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// How a terminal policy failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The classifier ended the policy with `passed = false`.
    Failed,
    /// Canceled by a sibling failure or the safety timer.
    Canceled,
    /// The policy's own timeout elapsed.
    TimedOut,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::TimedOut => "timed out",
        })
    }
}

/// One failing policy inside [`WaitError::PolicyFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyFailure {
    /// Policy key.
    pub key: PolicyKey,
    /// Terminal state the policy ended in.
    pub state: WaitState,
    /// Failure classification derived from the state.
    pub kind: FailureKind,
    /// Detail reported by the classifier or the signal that stopped it.
    pub detail: String,
}

impl PolicyFailure {
    /// Builds a failure record from a terminal failing outcome.
    ///
    /// Returns `None` for outcomes that are not failures.
    #[must_use]
    pub fn from_outcome(outcome: &PolicyOutcome) -> Option<Self> {
        if !outcome.is_failure() {
            return None;
        }
        let kind = match outcome.state {
            WaitState::Canceled => FailureKind::Canceled,
            WaitState::TimedOut => FailureKind::TimedOut,
            WaitState::Ended | WaitState::Checking => FailureKind::Failed,
        };
        Some(Self {
            key: outcome.key.clone(),
            state: outcome.state,
            kind,
            detail: outcome.detail.clone(),
        })
    }
}

impl fmt::Display for PolicyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "policy={} state={} ({})", self.key, self.state, self.kind)?;
        if !self.detail.is_empty() {
            write!(f, " detail={}", self.detail)?;
        }
        Ok(())
    }
}

/// Failure reported by a [`PropertyProbe`](crate::check::PropertyProbe).
///
/// Never fatal to a poller: the classifier decides what it means.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The probe command could not be started or awaited.
    #[error("probe I/O error: {0}")]
    Io(String),

    /// The probe command exited unsuccessfully.
    #[error("probe command failed (status {status}): {stderr}")]
    Command {
        /// Exit status, or -1 if terminated by a signal.
        status: i32,
        /// Captured stderr.
        stderr: String,
    },

    /// The probe produced output that does not carry a value.
    #[error("unexpected probe output: {0}")]
    UnexpectedOutput(String),

    /// The resource is not (yet) reachable.
    #[error("resource unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
