// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # vela-policy
//!
//! Built-in creation policies for the Vela readiness engine.
//!
//! This crate provides:
//! - **`cloud_init_done_by_vm_guestproperty`**: waits for cloud-init to report
//!   through the VirtualBox guest additions
//! - **`guest_property_equals`**: waits for any guest property to reach an
//!   expected value
//! - **[`VBoxManageProbe`]**: reads guest properties with `VBoxManage`
//!
//! ## Iron Lotus Framework
//!
//! - **Standardized Work**: every built-in type is a plain constructor
//!   registered under a fixed name
//! - **Poka-Yoke**: type-specific fields are checked when the policy is built
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vela_core::{ReadinessWaiter, Target, WaitConfig};
//! use vela_policy::{VBoxManageProbe, builtin_registry};
//!
//! let registry = builtin_registry()?;
//! let target = Target::new("web-1", Arc::new(VBoxManageProbe::new()));
//! let config = WaitConfig::load("vela.toml")?;
//! ReadinessWaiter::new(&registry)
//!     .with_config(&config)
//!     .wait_for_policies(&config.creation_policy, &target)
//!     .await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cloud_init;
pub mod guest_property;
pub mod vbox;

pub use cloud_init::{CLOUD_INIT_DONE, CLOUD_INIT_STATUS_PROPERTY, classify_cloud_init, cloud_init_done};
pub use guest_property::{GUEST_PROPERTY_EQUALS, PropertyEquals, guest_property_equals};
pub use vbox::{VBOXMANAGE, VBoxManageProbe, parse_guestproperty_output};

use vela_core::{PolicyRegistry, Result};

/// Registers every built-in policy type on `registry`.
///
/// # Errors
/// Returns a configuration error if a built-in name is already taken.
pub fn register_builtins(registry: &mut PolicyRegistry) -> Result<()> {
    registry.register(CLOUD_INIT_DONE, cloud_init_done)?;
    registry.register(GUEST_PROPERTY_EQUALS, guest_property_equals)?;
    Ok(())
}

/// Registry holding only the built-in policy types.
///
/// # Errors
/// Never fails on a fresh registry; the `Result` mirrors [`register_builtins`].
pub fn builtin_registry() -> Result<PolicyRegistry> {
    let mut registry = PolicyRegistry::new();
    register_builtins(&mut registry)?;
    Ok(registry)
}
