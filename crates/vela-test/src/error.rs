//! Test error types.

use std::time::Duration;

/// Result type alias for test operations.
pub type Result<T> = std::result::Result<T, TestError>;

/// Testing errors.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// Assertion failed.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Wait took longer than allowed.
    #[error("wait took {elapsed:?}, allowed {bound:?}")]
    Timeout {
        /// Measured duration.
        elapsed: Duration,
        /// Upper bound.
        bound: Duration,
    },

    /// Engine error.
    #[error("wait error: {0}")]
    Wait(#[from] vela_core::WaitError),
}

impl TestError {
    /// Creates an assertion error.
    #[must_use]
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }
}
