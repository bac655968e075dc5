// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # vela-core
//!
//! Readiness-waiting engine for the Vela framework.
//!
//! Given the creation policies declared for a provisioned resource, the
//! engine polls each policy's condition on its own task, cancels the
//! siblings as soon as one fails, and returns once every policy is terminal
//! or the global safety timer has forced them to be.
//!
//! - [`ReadinessWaiter`] - entry point for one wait call
//! - [`PolicyRegistry`] - policy type name to constructor
//! - [`PropertyProbe`] and [`Classifier`] - the two collaborator seams
//! - [`CancellationGuard`] - single-fire cancellation
//! - [`WaitConfig`] - TOML-backed policy declarations
//!
//! ## Iron Lotus Framework
//!
//! - **Jidoka**: the first failure stops the line for every sibling
//! - **Poka-Yoke**: declarations are validated before anything starts
//! - **Genchi Genbutsu**: conditions are sampled at the resource, not assumed
//!
//! ## Example
//!
//! ```rust,ignore
//! use vela_core::{PolicyRegistry, ReadinessWaiter, Target, WaitConfig};
//!
//! let config = WaitConfig::load("vela.toml")?;
//! let waiter = ReadinessWaiter::new(&registry).with_config(&config);
//! waiter
//!     .wait_for_policies(&config.creation_policy, &Target::new("vm1", probe))
//!     .await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod check;
pub mod config;
pub mod duration;
pub mod error;
pub mod guard;
pub mod policy;
pub mod poller;
pub mod registry;
pub mod report;
pub mod safety;
pub mod types;
pub mod waiter;

pub use aggregator::Aggregator;
pub use check::{Check, Classifier, ProbeReading, PropertyCheck, PropertyProbe, Target};
pub use config::{DEFAULT_TIMEOUT, PolicySpec, WaitConfig};
pub use duration::{MAX_DURATION, parse_iso8601};
pub use error::{FailureKind, PolicyFailure, ProbeError, Result, WaitError};
pub use guard::{CancelSignal, CancellationGuard};
pub use policy::PolicyInstance;
pub use poller::{MAX_TICK, MIN_TICK, Poller, tick_interval};
pub use registry::{PolicyFactory, PolicyRegistry};
pub use report::ReadinessReport;
pub use safety::{DEFAULT_SAFETY_BUFFER, SAFETY_TIMEOUT_REASON, SafetyTimer};
pub use types::{PolicyKey, PolicyOutcome, WaitId, WaitState};
pub use waiter::ReadinessWaiter;
