//! Falsification Tests: Category D - Built-in Policy Types (F031-F040)
//!
//! # Toyota Way: Standardized Work
//! Every built-in type behaves the same way through the same engine.

use std::time::Duration;

use serde_json::json;
use vela_core::{PolicySpec, WaitState};
use vela_policy::{
    CLOUD_INIT_DONE, CLOUD_INIT_STATUS_PROPERTY, GUEST_PROPERTY_EQUALS, parse_guestproperty_output,
};
use vela_test::{ScriptedProbe, TestError, WaitHarness};

const NET_STATUS: &str = "/VirtualBox/GuestInfo/Net/0/Status";

fn harness() -> WaitHarness {
    WaitHarness::builder()
        .with_builtins()
        .with_resource("web-1")
        .build()
        .expect("harness")
}

fn cloud_init(timeout: &str) -> PolicySpec {
    PolicySpec::new(CLOUD_INIT_DONE).with_timeout(timeout)
}

fn net_up() -> PolicySpec {
    PolicySpec::new(GUEST_PROPERTY_EQUALS)
        .with_timeout("PT30S")
        .with_field("property", NET_STATUS)
        .with_field("expected", "Up")
        .with_field("failure_values", json!(["Down"]))
}

// =============================================================================
// F031-F035: cloud_init_done_by_vm_guestproperty
// =============================================================================

/// F031: cloud-init `status: done` passes
///
/// # Falsification Attempt
/// Script running then done.
#[tokio::test(start_paused = true)]
async fn f031_cloud_init_done_passes() {
    let probe = ScriptedProbe::new().script(CLOUD_INIT_STATUS_PROPERTY, &["status: running", "status: done"]);
    let run = harness().run(&[cloud_init("PT3M")], probe).await.unwrap();
    assert!(run.report.is_ready(), "F031 FALSIFIED: done did not pass");
}

/// F032: cloud-init `status: error` fails with a message naming the policy
///
/// # Falsification Attempt
/// Script running then error.
#[tokio::test(start_paused = true)]
async fn f032_cloud_init_error_fails() {
    let probe = ScriptedProbe::new().script(CLOUD_INIT_STATUS_PROPERTY, &["status: running", "status: error"]);
    let run = harness().run(&[cloud_init("PT3M")], probe).await.unwrap();

    let err = run.report.into_result().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("cloud_init_done_by_vm_guestproperty_0"), "F032 FALSIFIED: {msg}");
    assert!(msg.contains("status: error"), "F032 FALSIFIED: detail missing");
}

/// F033: Missing guest property keeps waiting until the timeout
///
/// # Falsification Attempt
/// The guest additions never set the property.
#[tokio::test(start_paused = true)]
async fn f033_unset_property_times_out() {
    let probe = ScriptedProbe::new().script_readings(
        CLOUD_INIT_STATUS_PROPERTY,
        vec![parse_guestproperty_output("No value set!")],
    );
    let run = harness().run(&[cloud_init("PT2S")], probe).await.unwrap();

    let outcome = run.outcome("cloud_init_done_by_vm_guestproperty_0").unwrap();
    assert_eq!(outcome.state, WaitState::TimedOut, "F033 FALSIFIED: unset property ended early");
    run.assert_within(Duration::from_secs(3)).unwrap();
}

/// F034: Unknown cloud-init statuses are not terminal
///
/// # Falsification Attempt
/// Feed `status: disabled` until timeout.
#[tokio::test(start_paused = true)]
async fn f034_unknown_status_keeps_checking() {
    let probe = ScriptedProbe::new().script(CLOUD_INIT_STATUS_PROPERTY, &["status: disabled"]);
    let run = harness().run(&[cloud_init("PT1S")], probe).await.unwrap();
    assert_eq!(
        run.outcome("cloud_init_done_by_vm_guestproperty_0").unwrap().state,
        WaitState::TimedOut,
        "F034 FALSIFIED: unknown status was terminal"
    );
}

/// F035: The probe is asked about the right VM
///
/// # Falsification Attempt
/// Harness resource name must reach the probe; verified indirectly by the
/// property it reads.
#[tokio::test(start_paused = true)]
async fn f035_reads_cloud_init_property() {
    let probe = ScriptedProbe::new().script(CLOUD_INIT_STATUS_PROPERTY, &["status: done"]);
    harness().run(&[cloud_init("PT3M")], probe.clone()).await.unwrap();
    assert_eq!(probe.calls(CLOUD_INIT_STATUS_PROPERTY).len(), 1, "F035 FALSIFIED");
    assert_eq!(probe.total_calls(), 1, "F035 FALSIFIED: read other properties");
}

// =============================================================================
// F036-F040: guest_property_equals
// =============================================================================

/// F036: Expected value passes
#[tokio::test(start_paused = true)]
async fn f036_expected_value_passes() {
    let probe = ScriptedProbe::new().script(NET_STATUS, &["", "Up"]);
    let run = harness().run(&[net_up()], probe).await.unwrap();
    assert!(run.report.is_ready(), "F036 FALSIFIED");
}

/// F037: Failure value fails and cancels cloud-init
///
/// # Falsification Attempt
/// Network goes down while cloud-init is still running.
#[tokio::test(start_paused = true)]
async fn f037_failure_value_cancels_siblings() {
    let probe = ScriptedProbe::new()
        .script(CLOUD_INIT_STATUS_PROPERTY, &["status: running"])
        .script(NET_STATUS, &["Down"]);
    let run = harness().run(&[cloud_init("PT3M"), net_up()], probe).await.unwrap();

    let ci = run.outcome("cloud_init_done_by_vm_guestproperty_0").unwrap();
    assert_eq!(ci.state, WaitState::Canceled, "F037 FALSIFIED: cloud-init not canceled");
    assert!(ci.detail.contains("guest_property_equals_1"));
}

/// F038: Missing `expected` is a configuration error naming the key
#[tokio::test]
async fn f038_missing_expected_rejected() {
    let mut spec = net_up();
    spec.fields.remove("expected");
    let err = harness().run(&[spec], ScriptedProbe::new()).await.unwrap_err();

    match err {
        TestError::Wait(e) => {
            assert!(e.is_config());
            assert!(e.to_string().contains("guest_property_equals_0"), "F038 FALSIFIED: {e}");
        }
        other => panic!("F038 FALSIFIED: unexpected error {other}"),
    }
}

/// F039: `failure_values` of the wrong shape is rejected
#[tokio::test]
async fn f039_mistyped_failure_values_rejected() {
    let spec = net_up().with_field("failure_values", json!({"down": true}));
    let err = harness().run(&[spec], ScriptedProbe::new()).await.unwrap_err();
    assert!(matches!(err, TestError::Wait(e) if e.is_config()), "F039 FALSIFIED");
}

/// F040: A single string is accepted as a one-element `failure_values`
#[tokio::test(start_paused = true)]
async fn f040_single_failure_value() {
    let spec = net_up().with_field("failure_values", "Down");
    let probe = ScriptedProbe::new().script(NET_STATUS, &["Down"]);
    let run = harness().run(&[spec], probe).await.unwrap();
    assert!(run.outcome("guest_property_equals_0").unwrap().is_failure(), "F040 FALSIFIED");
}
