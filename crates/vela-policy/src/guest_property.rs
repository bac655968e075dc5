//! `guest_property_equals`.
//!
//! Generalizes the cloud-init policy to any guest property:
//!
//! ```toml
//! [[creation_policy]]
//! type = "guest_property_equals"
//! property = "/VirtualBox/GuestInfo/Net/0/Status"
//! expected = "Up"
//! failure_values = ["Down"]
//! ```

use std::sync::Arc;

use vela_core::{
    Classifier, PolicyInstance, PolicyKey, PolicyOutcome, PolicySpec, ProbeReading,
    PropertyCheck, Result, Target, WaitError,
};

/// Registered type name.
pub const GUEST_PROPERTY_EQUALS: &str = "guest_property_equals";

/// Passes on `expected`, fails on any of `failure_values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEquals {
    expected: String,
    failure_values: Vec<String>,
}

impl PropertyEquals {
    /// Creates a classifier waiting for `expected`.
    #[must_use]
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            failure_values: Vec::new(),
        }
    }

    /// Values that end the policy as failed.
    #[must_use]
    pub fn with_failure_values(mut self, values: Vec<String>) -> Self {
        self.failure_values = values;
        self
    }

    /// Value that passes the policy.
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }
}

impl Classifier for PropertyEquals {
    fn classify(&self, key: &PolicyKey, reading: &ProbeReading) -> PolicyOutcome {
        match reading {
            Ok(value) if *value == self.expected => PolicyOutcome::ended(key.clone(), true, value.clone()),
            Ok(value) if self.failure_values.contains(value) => {
                PolicyOutcome::ended(key.clone(), false, value.clone())
            }
            Ok(value) => PolicyOutcome::checking(key.clone(), value.clone()),
            Err(e) => PolicyOutcome::checking(key.clone(), e.to_string()),
        }
    }
}

/// Constructor for [`GUEST_PROPERTY_EQUALS`].
///
/// # Errors
/// Returns a configuration error naming `key` if `property` or `expected` is
/// missing, if `failure_values` is not a list of strings, if `expected` is
/// itself a failure value, or if the timeout is malformed.
pub fn guest_property_equals(key: &PolicyKey, target: &Target, spec: &PolicySpec) -> Result<PolicyInstance> {
    let property = spec.required_str(key, "property")?;
    let expected = spec.required_str(key, "expected")?;
    let failure_values = spec.str_list(key, "failure_values")?;
    if failure_values.iter().any(|v| v == expected) {
        return Err(WaitError::config(format!(
            "creation policy {key}: expected value {expected:?} is also listed in failure_values"
        )));
    }
    let timeout = spec.timeout()?;

    let classifier = PropertyEquals::new(expected).with_failure_values(failure_values);
    let check = PropertyCheck::new(target, property, Arc::new(classifier));
    Ok(PolicyInstance::new(key.clone(), GUEST_PROPERTY_EQUALS, timeout, Arc::new(check)))
}
