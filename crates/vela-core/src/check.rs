//! Probe and classifier seams.
//!
//! A [`Check`] is one sampling step of a policy: probe the resource, then
//! classify what came back. [`PropertyCheck`] is the common shape built from
//! a [`PropertyProbe`] and a [`Classifier`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::types::{PolicyKey, PolicyOutcome};

/// Value-or-error pair returned by a probe.
pub type ProbeReading = std::result::Result<String, ProbeError>;

/// Reads a named property of a provisioned resource.
///
/// Supplied by resource-management code. Errors are data: the poller hands
/// them to the classifier and keeps going unless told otherwise.
#[async_trait]
pub trait PropertyProbe: Send + Sync + 'static {
    /// Reads `property` from `resource`.
    async fn read(&self, resource: &str, property: &str) -> ProbeReading;
}

/// Maps a probe reading to a policy outcome.
///
/// Must be total and side-effect free.
pub trait Classifier: Send + Sync + 'static {
    /// Classifies one reading for the policy `key`.
    fn classify(&self, key: &PolicyKey, reading: &ProbeReading) -> PolicyOutcome;
}

impl<F> Classifier for F
where
    F: Fn(&PolicyKey, &ProbeReading) -> PolicyOutcome + Send + Sync + 'static,
{
    fn classify(&self, key: &PolicyKey, reading: &ProbeReading) -> PolicyOutcome {
        self(key, reading)
    }
}

/// One probe-and-classify step, repeated by a poller.
#[async_trait]
pub trait Check: Send + Sync + 'static {
    /// Samples the condition once.
    async fn check(&self, key: &PolicyKey) -> PolicyOutcome;
}

/// The resource a set of policies is attached to.
#[derive(Clone)]
pub struct Target {
    name: String,
    probe: Arc<dyn PropertyProbe>,
}

impl Target {
    /// Creates a target probed through `probe`.
    #[must_use]
    pub fn new(name: impl Into<String>, probe: Arc<dyn PropertyProbe>) -> Self {
        Self {
            name: name.into(),
            probe,
        }
    }

    /// Resource name passed to the probe.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared probe for this resource.
    #[must_use]
    pub fn probe(&self) -> Arc<dyn PropertyProbe> {
        Arc::clone(&self.probe)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Probes one property and classifies the reading.
pub struct PropertyCheck {
    resource: String,
    property: String,
    probe: Arc<dyn PropertyProbe>,
    classifier: Arc<dyn Classifier>,
}

impl PropertyCheck {
    /// Creates a check of `property` on `target`.
    #[must_use]
    pub fn new(
        target: &Target,
        property: impl Into<String>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            resource: target.name().to_string(),
            property: property.into(),
            probe: target.probe(),
            classifier,
        }
    }

    /// The probed property name.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }
}

#[async_trait]
impl Check for PropertyCheck {
    async fn check(&self, key: &PolicyKey) -> PolicyOutcome {
        let reading = self.probe.read(&self.resource, &self.property).await;
        let mut outcome = self.classifier.classify(key, &reading);
        if outcome.key != *key {
            tracing::warn!(key = %key, got = %outcome.key, "classifier returned foreign key, rewriting");
            outcome.key = key.clone();
        }
        tracing::debug!(
            key = %key,
            property = %self.property,
            reading = ?reading,
            state = %outcome.state,
            "probed property"
        );
        outcome
    }
}
