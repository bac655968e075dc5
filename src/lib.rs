//! Vela: Creation-Policy Readiness Waiting
//!
//! Part of the PAIML Sovereign AI Stack.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vela::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let registry = builtin_registry()?;
//! let config = WaitConfig::load("vela.toml")?;
//! let target = Target::new("web-1", std::sync::Arc::new(VBoxManageProbe::new()));
//!
//! ReadinessWaiter::new(&registry)
//!     .with_config(&config)
//!     .wait_for_policies(&config.creation_policy, &target)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub use vela_core as core;
pub use vela_policy as policy;

/// Prelude module for common imports.
pub mod prelude {
    pub use vela_core::{
        CancellationGuard, Classifier, PolicyKey, PolicyOutcome, PolicyRegistry, PolicySpec,
        PropertyCheck, PropertyProbe, ReadinessReport, ReadinessWaiter, Result, Target,
        WaitConfig, WaitError, WaitState,
    };
    pub use vela_policy::{VBoxManageProbe, builtin_registry, register_builtins};
}
