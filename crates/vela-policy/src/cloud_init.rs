//! `cloud_init_done_by_vm_guestproperty`.
//!
//! The guest's cloud-init writes its final status into a guest property; the
//! policy passes on `status: done` and fails on `status: error`.

use std::sync::Arc;

use vela_core::{
    PolicyInstance, PolicyKey, PolicyOutcome, PolicySpec, ProbeReading, PropertyCheck, Result,
    Target,
};

/// Registered type name.
pub const CLOUD_INIT_DONE: &str = "cloud_init_done_by_vm_guestproperty";

/// Guest property cloud-init reports into.
pub const CLOUD_INIT_STATUS_PROPERTY: &str = "/VirtualBox/GuestInfo/CloudInit/Status";

const STATUS_DONE: &str = "status: done";
const STATUS_ERROR: &str = "status: error";

/// Maps a cloud-init status reading to an outcome.
///
/// A probe error keeps the policy checking, with the error text as detail.
#[must_use]
pub fn classify_cloud_init(key: &PolicyKey, reading: &ProbeReading) -> PolicyOutcome {
    match reading {
        Ok(value) if value == STATUS_DONE => PolicyOutcome::ended(key.clone(), true, value.clone()),
        Ok(value) if value == STATUS_ERROR => PolicyOutcome::ended(key.clone(), false, value.clone()),
        Ok(value) => PolicyOutcome::checking(key.clone(), value.clone()),
        Err(e) => PolicyOutcome::checking(key.clone(), e.to_string()),
    }
}

/// Constructor for [`CLOUD_INIT_DONE`].
///
/// # Errors
/// Returns a configuration error for a malformed timeout.
pub fn cloud_init_done(key: &PolicyKey, target: &Target, spec: &PolicySpec) -> Result<PolicyInstance> {
    let timeout = spec.timeout()?;
    let check = PropertyCheck::new(target, CLOUD_INIT_STATUS_PROPERTY, Arc::new(classify_cloud_init));
    Ok(PolicyInstance::new(key.clone(), CLOUD_INIT_DONE, timeout, Arc::new(check)))
}
