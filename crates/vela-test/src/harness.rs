//! Wait test harness.
//!
//! # Toyota Way: Built-in Quality (品質の作り込み)
//! Quality cannot be inspected in; it must be built in.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use vela_core::{
    DEFAULT_SAFETY_BUFFER, PolicyInstance, PolicyKey, PolicyOutcome, PolicyRegistry, PolicySpec,
    PropertyCheck, PropertyProbe, ReadinessReport, ReadinessWaiter, Target,
};

use crate::error::{Result, TestError};
use crate::probe::status_classifier;

/// Policy type registered by every harness: probes field `property` and
/// classifies it with [`status_classifier`].
pub const SCRIPTED: &str = "scripted";

/// Constructor for [`SCRIPTED`].
///
/// # Errors
/// Returns a configuration error if `property` is missing or the timeout is
/// malformed.
pub fn scripted_policy(key: &PolicyKey, target: &Target, spec: &PolicySpec) -> vela_core::Result<PolicyInstance> {
    let property = spec.required_str(key, "property")?;
    let check = PropertyCheck::new(target, property, Arc::new(status_classifier));
    Ok(PolicyInstance::new(key.clone(), SCRIPTED, spec.timeout()?, Arc::new(check)))
}

/// Declaration of a [`SCRIPTED`] policy on `property`.
#[must_use]
pub fn scripted(property: &str, timeout: &str) -> PolicySpec {
    PolicySpec::new(SCRIPTED)
        .with_timeout(timeout)
        .with_field("property", property)
}

/// Runs wait calls against a fixed registry and resource name.
#[derive(Debug)]
pub struct WaitHarness {
    registry: PolicyRegistry,
    resource: String,
    safety_buffer: Duration,
}

impl WaitHarness {
    /// Creates a new harness builder.
    #[must_use]
    pub fn builder() -> WaitHarnessBuilder {
        WaitHarnessBuilder::default()
    }

    /// Registry used for every run.
    #[must_use]
    pub const fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Waits for `specs` against `probe`, measuring wall time.
    ///
    /// # Errors
    /// Returns [`TestError::Wait`] if the engine rejects the call.
    pub async fn run(&self, specs: &[PolicySpec], probe: Arc<dyn PropertyProbe>) -> Result<WaitRun> {
        let target = Target::new(self.resource.clone(), probe);
        let waiter = ReadinessWaiter::new(&self.registry).with_safety_buffer(self.safety_buffer);

        let start = Instant::now();
        let report = waiter.wait_with_report(specs, &target).await?;
        let elapsed = start.elapsed();
        tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, ready = report.is_ready(), "harness run finished");

        Ok(WaitRun { report, elapsed })
    }
}

/// Builder for [`WaitHarness`].
#[derive(Debug)]
pub struct WaitHarnessBuilder {
    builtins: bool,
    resource: String,
    safety_buffer: Duration,
}

impl Default for WaitHarnessBuilder {
    fn default() -> Self {
        Self {
            builtins: false,
            resource: "test-vm".to_string(),
            safety_buffer: DEFAULT_SAFETY_BUFFER,
        }
    }
}

impl WaitHarnessBuilder {
    /// Also registers the built-in policy types.
    #[must_use]
    pub const fn with_builtins(mut self) -> Self {
        self.builtins = true;
        self
    }

    /// Sets the resource name handed to the probe.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    /// Sets the safety buffer.
    #[must_use]
    pub const fn with_safety_buffer(mut self, buffer: Duration) -> Self {
        self.safety_buffer = buffer;
        self
    }

    /// Builds the harness.
    ///
    /// # Errors
    /// Returns an error if a policy type cannot be registered.
    pub fn build(self) -> Result<WaitHarness> {
        let mut registry = PolicyRegistry::new();
        registry.register(SCRIPTED, scripted_policy)?;
        if self.builtins {
            vela_policy::register_builtins(&mut registry)?;
        }
        Ok(WaitHarness {
            registry,
            resource: self.resource,
            safety_buffer: self.safety_buffer,
        })
    }
}

/// Result of one harness run.
#[derive(Debug, Clone)]
pub struct WaitRun {
    /// Report returned by the engine.
    pub report: ReadinessReport,
    /// Measured duration of the call.
    pub elapsed: Duration,
}

impl WaitRun {
    /// Outcome of the policy with key `key`.
    ///
    /// # Errors
    /// Returns an assertion error if no such policy was reported.
    pub fn outcome(&self, key: &str) -> Result<&PolicyOutcome> {
        self.report
            .outcome(&PolicyKey::new(key))
            .ok_or_else(|| TestError::assertion(format!("no outcome for {key}")))
    }

    /// Checks that the call finished within `bound`.
    ///
    /// # Errors
    /// Returns [`TestError::Timeout`] if it took longer.
    pub fn assert_within(&self, bound: Duration) -> Result<()> {
        if self.elapsed > bound {
            return Err(TestError::Timeout {
                elapsed: self.elapsed,
                bound,
            });
        }
        Ok(())
    }
}
