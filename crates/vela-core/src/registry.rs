//! Policy type registry.
//!
//! An explicit value built at startup and passed by reference to the waiter,
//! so tests can register fake types without touching shared state.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::check::Target;
use crate::config::PolicySpec;
use crate::error::{Result, WaitError};
use crate::policy::PolicyInstance;
use crate::types::PolicyKey;

/// Builds a [`PolicyInstance`] for one declaration.
pub trait PolicyFactory: Send + Sync + 'static {
    /// Constructs the policy `key` attached to `target`.
    ///
    /// # Errors
    /// Returns a configuration error for malformed type-specific fields.
    fn build(&self, key: &PolicyKey, target: &Target, spec: &PolicySpec) -> Result<PolicyInstance>;
}

impl<F> PolicyFactory for F
where
    F: Fn(&PolicyKey, &Target, &PolicySpec) -> Result<PolicyInstance> + Send + Sync + 'static,
{
    fn build(&self, key: &PolicyKey, target: &Target, spec: &PolicySpec) -> Result<PolicyInstance> {
        self(key, target, spec)
    }
}

/// Maps policy type names to their constructors.
#[derive(Default, Clone)]
pub struct PolicyRegistry {
    factories: BTreeMap<String, Arc<dyn PolicyFactory>>,
}

impl PolicyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `policy_type`.
    ///
    /// # Errors
    /// Returns a configuration error if the name is empty or already taken.
    pub fn register(
        &mut self,
        policy_type: impl Into<String>,
        factory: impl PolicyFactory,
    ) -> Result<()> {
        let policy_type = policy_type.into();
        if policy_type.trim().is_empty() {
            return Err(WaitError::config("policy type name cannot be empty"));
        }
        if self.factories.contains_key(&policy_type) {
            return Err(WaitError::Config(format!(
                "creation policy type {policy_type:?} already registered"
            )));
        }
        tracing::debug!(policy_type = %policy_type, "registered creation policy type");
        self.factories.insert(policy_type, Arc::new(factory));
        Ok(())
    }

    /// Returns true if `policy_type` is registered.
    #[must_use]
    pub fn contains(&self, policy_type: &str) -> bool {
        self.factories.contains_key(policy_type)
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds the policy declared by `spec`.
    ///
    /// # Errors
    /// Returns a configuration error naming the type and listing every
    /// registered type if `spec.policy_type` is unknown, or whatever the
    /// constructor reports.
    pub fn build(&self, key: &PolicyKey, target: &Target, spec: &PolicySpec) -> Result<PolicyInstance> {
        let factory = self.factories.get(&spec.policy_type).ok_or_else(|| {
            WaitError::Config(format!(
                "creation policy type {:?} not supported yet; supported are: [{}]",
                spec.policy_type,
                self.types().join(", ")
            ))
        })?;

        let instance = factory.build(key, target, spec).map_err(|e| match e {
            WaitError::Config(msg) => WaitError::Config(format!(
                "failed to construct creation policy {key}: {msg}"
            )),
            other => other,
        })?;

        if instance.key() != key {
            return Err(WaitError::internal(format!(
                "constructor for {:?} returned policy {} instead of {key}",
                spec.policy_type,
                instance.key()
            )));
        }
        Ok(instance)
    }
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("types", &self.types())
            .finish()
    }
}
