//! Core types for readiness waiting.
//!
//! Per Iron Lotus Framework: explicit state machines, no implicit transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for one wait call.
///
/// Only used to correlate log lines and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaitId(uuid::Uuid);

impl WaitId {
    /// Creates a new random wait ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for WaitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WaitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key identifying a policy within one wait call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyKey(String);

impl PolicyKey {
    /// Creates a key from an arbitrary string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Synthesizes the key of the `index`-th declared policy: `<type>_<index>`.
    #[must_use]
    pub fn indexed(policy_type: &str, index: usize) -> Self {
        Self(format!("{policy_type}_{index}"))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Policy wait state.
///
/// ```text
/// Checking ──┬──→ Ended (passed | failed)
///            ├──→ Canceled
///            └──→ TimedOut
/// ```
/// `Checking` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitState {
    /// Still polling.
    Checking,
    /// Stopped by a sibling failure or the safety timer.
    Canceled,
    /// The classifier reached a verdict.
    Ended,
    /// The policy's own timeout elapsed first.
    TimedOut,
}

impl WaitState {
    /// Returns true for `Canceled`, `Ended` and `TimedOut`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Checking)
    }
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Checking => "checking",
            Self::Canceled => "canceled",
            Self::Ended => "ended",
            Self::TimedOut => "timeout",
        })
    }
}

/// Result of classifying one probe, or the final word on a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    /// Policy key.
    pub key: PolicyKey,
    /// Wait state.
    pub state: WaitState,
    /// Verdict; only meaningful when `state` is `Ended`.
    pub passed: bool,
    /// Free-form diagnostic detail.
    #[serde(default)]
    pub detail: String,
}

impl PolicyOutcome {
    /// Non-terminal outcome: keep polling.
    #[must_use]
    pub fn checking(key: PolicyKey, detail: impl Into<String>) -> Self {
        Self {
            key,
            state: WaitState::Checking,
            passed: false,
            detail: detail.into(),
        }
    }

    /// Terminal verdict from a classifier.
    #[must_use]
    pub fn ended(key: PolicyKey, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            key,
            state: WaitState::Ended,
            passed,
            detail: detail.into(),
        }
    }

    /// Terminal cancellation carrying the cancel reason.
    #[must_use]
    pub fn canceled(key: PolicyKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            state: WaitState::Canceled,
            passed: false,
            detail: reason.into(),
        }
    }

    /// Terminal per-policy timeout.
    #[must_use]
    pub fn timed_out(key: PolicyKey, detail: impl Into<String>) -> Self {
        Self {
            key,
            state: WaitState::TimedOut,
            passed: false,
            detail: detail.into(),
        }
    }

    /// Returns true if the policy will not change state again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns true if the policy ended without passing.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        match self.state {
            WaitState::Canceled | WaitState::TimedOut => true,
            WaitState::Ended => !self.passed,
            WaitState::Checking => false,
        }
    }

    /// Returns true only for `Ended` with `passed = true`.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self.state, WaitState::Ended) && self.passed
    }
}

impl fmt::Display for PolicyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}", self.key, self.state)?;
        if matches!(self.state, WaitState::Ended) {
            write!(f, ", passed={}", self.passed)?;
        }
        f.write_str("]")?;
        if !self.detail.is_empty() {
            write!(f, " {}", self.detail)?;
        }
        Ok(())
    }
}
