//! # vela-test
//!
//! Testing infrastructure for the Vela readiness engine.
//!
//! This crate provides:
//! - **Scripted probes**: deterministic property readings per property
//! - **Chaos injection**: latency and error injection around any probe
//! - **Wait harness**: registry plus timing around a wait call
//! - **Falsification tests**: Popperian tests for the engine's claims
//!
//! ## Iron Lotus Framework
//!
//! - **Built-in Quality** (品質の作り込み): Quality cannot be inspected in
//! - **Popperian Falsification**: Tests designed to refute claims
//! - **Extreme TDD**: Write failing tests first
//!
//! ## Example
//!
//! ```rust,ignore
//! use vela_test::{ScriptedProbe, WaitHarness, scripted};
//!
//! let harness = WaitHarness::builder().build()?;
//! let probe = ScriptedProbe::new().script("status", &["status: running", "status: done"]);
//!
//! let run = harness.run(&[scripted("status", "PT10S")], probe).await?;
//! assert!(run.report.is_ready());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod chaos;
pub mod error;
pub mod harness;
pub mod probe;

pub use chaos::{ChaosConfig, ChaosProbe};
pub use error::{Result, TestError};
pub use harness::{SCRIPTED, WaitHarness, WaitHarnessBuilder, WaitRun, scripted, scripted_policy};
pub use probe::{HangingProbe, ScriptedProbe, status_classifier};
