//! Chaos injection for probe resilience testing.
//!
//! # Reference
//! Netflix. (2012). Chaos Monkey. GitHub.
//! <https://github.com/Netflix/chaosmonkey>
//!
//! Injection is deterministic (every n-th read) so paused-time tests stay
//! reproducible.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use vela_core::{ProbeError, ProbeReading, PropertyProbe};

/// Chaos injection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChaosConfig {
    /// Latency injection: (every n-th read, delay).
    pub latency_injection: Option<(u64, Duration)>,
    /// Error injection: every n-th read fails.
    pub error_injection: Option<u64>,
}

impl ChaosConfig {
    /// Delays every `every`-th read by `delay`.
    #[must_use]
    pub fn latency(every: u64, delay: Duration) -> Self {
        Self {
            latency_injection: Some((every, delay)),
            ..Default::default()
        }
    }

    /// Fails every `every`-th read.
    #[must_use]
    pub fn errors(every: u64) -> Self {
        Self {
            error_injection: Some(every),
            ..Default::default()
        }
    }
}

fn hits(every: u64, read: u64) -> bool {
    every > 0 && read % every == 0
}

/// Wraps a probe and injects latency or errors into its reads.
pub struct ChaosProbe {
    inner: Arc<dyn PropertyProbe>,
    config: ChaosConfig,
    reads: AtomicU64,
}

impl ChaosProbe {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn PropertyProbe>, config: ChaosConfig) -> Self {
        Self {
            inner,
            config,
            reads: AtomicU64::new(0),
        }
    }

    /// Returns the chaos config.
    #[must_use]
    pub const fn config(&self) -> &ChaosConfig {
        &self.config
    }

    /// Reads attempted so far, including injected failures.
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PropertyProbe for ChaosProbe {
    async fn read(&self, resource: &str, property: &str) -> ProbeReading {
        let read = self.reads.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((every, delay)) = self.config.latency_injection
            && hits(every, read)
        {
            tracing::debug!("injecting latency: {delay:?}");
            tokio::time::sleep(delay).await;
        }

        if let Some(every) = self.config.error_injection
            && hits(every, read)
        {
            tracing::debug!(read, "injecting probe error");
            return Err(ProbeError::Unavailable(format!("chaos: injected failure on read {read}")));
        }

        self.inner.read(resource, property).await
    }
}
