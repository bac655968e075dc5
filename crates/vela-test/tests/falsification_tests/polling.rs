//! Falsification Tests: Category A - Polling and Timeouts (F001-F010)
//!
//! # Toyota Way: Genchi Genbutsu (現地現物)
//! The resource is sampled on a fixed cadence until it answers or time runs out.

use std::sync::Arc;
use std::time::Duration;

use vela_core::{MIN_TICK, ProbeError, WaitState, tick_interval};
use vela_test::{ChaosConfig, ChaosProbe, ScriptedProbe, WaitHarness, scripted};

fn harness() -> WaitHarness {
    WaitHarness::builder().build().expect("harness")
}

// =============================================================================
// F001-F004: Cadence
// =============================================================================

/// F001: Consecutive probes are at least one tick apart
///
/// # Falsification Attempt
/// Keep a PT3M policy checking for a while, inspect probe instants.
#[tokio::test(start_paused = true)]
async fn f001_probes_spaced_by_tick() {
    let probe = ScriptedProbe::new().script(
        "s",
        &["status: running", "status: running", "status: running", "status: done"],
    );
    let run = harness().run(&[scripted("s", "PT3M")], probe.clone()).await.unwrap();
    assert!(run.report.is_ready(), "F001 FALSIFIED: policy did not pass");

    let tick = tick_interval(Duration::from_secs(180));
    let calls = probe.calls("s");
    assert_eq!(calls.len(), 4, "F001 FALSIFIED: unexpected probe count");
    for pair in calls.windows(2) {
        assert!(
            pair[1] - pair[0] >= tick,
            "F001 FALSIFIED: probes {:?} apart, tick is {tick:?}",
            pair[1] - pair[0]
        );
    }
}

/// F002: The tick never drops below 100 ms
///
/// # Falsification Attempt
/// Use a timeout shorter than the floor and count probes.
#[tokio::test(start_paused = true)]
async fn f002_tick_floor_holds_for_tiny_timeouts() {
    let probe = ScriptedProbe::new().script("s", &["status: running"]);
    let run = harness().run(&[scripted("s", "PT0.05S")], probe.clone()).await.unwrap();

    assert_eq!(
        run.outcome("scripted_0").unwrap().state,
        WaitState::TimedOut,
        "F002 FALSIFIED: tiny timeout did not time out"
    );
    let calls = probe.calls("s");
    assert_eq!(calls.len(), 2, "F002 FALSIFIED: probed {} times", calls.len());
    assert!(calls[1] - calls[0] >= MIN_TICK, "F002 FALSIFIED: tick below floor");
}

/// F003: A terminal reading stops probing immediately
///
/// # Falsification Attempt
/// Pass on the first read and verify no second read happens.
#[tokio::test(start_paused = true)]
async fn f003_terminal_reading_stops_probing() {
    let probe = ScriptedProbe::new().script("s", &["status: done"]);
    let run = harness().run(&[scripted("s", "PT10S")], probe.clone()).await.unwrap();

    assert!(run.report.is_ready());
    assert_eq!(probe.calls("s").len(), 1, "F003 FALSIFIED: probed after terminal reading");
    assert!(run.elapsed < MIN_TICK, "F003 FALSIFIED: waited a tick after passing");
}

/// F004: Probe errors are not fatal
///
/// # Falsification Attempt
/// Inject an error on every other read; the policy must still pass.
#[tokio::test(start_paused = true)]
async fn f004_probe_errors_keep_checking() {
    let inner = ScriptedProbe::new().script("s", &["status: running", "status: running", "status: done"]);
    let chaos = Arc::new(ChaosProbe::new(inner, ChaosConfig::errors(2)));

    let run = harness().run(&[scripted("s", "PT30S")], chaos.clone()).await.unwrap();
    assert!(run.report.is_ready(), "F004 FALSIFIED: injected probe error failed the policy");
    assert!(chaos.reads() >= 4, "F004 FALSIFIED: errors were not retried");
}

// =============================================================================
// F005-F008: Timeouts
// =============================================================================

/// F005: A policy that never resolves times out at its own timeout
///
/// # Falsification Attempt
/// PT2S policy stuck in `status: running`.
#[tokio::test(start_paused = true)]
async fn f005_timeout_fires_near_deadline() {
    let probe = ScriptedProbe::new().script("s", &["status: running"]);
    let run = harness().run(&[scripted("s", "PT2S")], probe).await.unwrap();

    let outcome = run.outcome("scripted_0").unwrap();
    assert_eq!(outcome.state, WaitState::TimedOut, "F005 FALSIFIED: not timed out");
    assert_eq!(outcome.detail, "timeout-scripted_0", "F005 FALSIFIED: wrong detail");
    assert!(run.elapsed >= Duration::from_secs(2), "F005 FALSIFIED: timed out early");
    run.assert_within(Duration::from_secs(4)).unwrap();
    assert!(!run.report.safety_timer_fired, "F005 FALSIFIED: safety timer needed");
}

/// F006: Timeouts of independent policies overlap
///
/// # Falsification Attempt
/// Four PT2S policies must finish in roughly 2s, not 8s.
#[tokio::test(start_paused = true)]
async fn f006_policies_run_concurrently() {
    let probe = ScriptedProbe::new();
    let specs: Vec<_> = ["a", "b", "c", "d"].iter().map(|p| scripted(p, "PT2S")).collect();

    let run = harness().run(&specs, probe).await.unwrap();
    assert_eq!(run.report.outcomes.len(), 4);
    assert!(run.report.outcomes.iter().all(|o| o.state == WaitState::TimedOut));
    run.assert_within(Duration::from_secs(3)).unwrap();
}

/// F007: Absent timeout means PT3M
///
/// # Falsification Attempt
/// Declare without a timeout and compare to an explicit PT3M.
#[test]
fn f007_default_timeout_is_three_minutes() {
    let spec = vela_core::PolicySpec::new("scripted");
    assert_eq!(
        spec.timeout().unwrap(),
        Duration::from_secs(180),
        "F007 FALSIFIED: default timeout is not PT3M"
    );
}

/// F008: Slow probes count against the timeout
///
/// # Falsification Attempt
/// Every read takes 1s, timeout is PT2S; the policy must not outlive ~3s.
#[tokio::test(start_paused = true)]
async fn f008_slow_probe_still_times_out() {
    let inner = ScriptedProbe::new().script("s", &["status: running"]);
    let slow = Arc::new(ChaosProbe::new(inner, ChaosConfig::latency(1, Duration::from_secs(1))));

    let run = harness().run(&[scripted("s", "PT2S")], slow).await.unwrap();
    assert_eq!(run.outcome("scripted_0").unwrap().state, WaitState::TimedOut);
    run.assert_within(Duration::from_millis(3500)).unwrap();
}

// =============================================================================
// F009-F010: Reporting
// =============================================================================

/// F009: Outcomes come back in declaration order
///
/// # Falsification Attempt
/// Make the last declared policy finish first.
#[tokio::test(start_paused = true)]
async fn f009_outcomes_in_declaration_order() {
    let probe = ScriptedProbe::new()
        .script("late", &["status: running", "status: running", "status: done"])
        .script("early", &["status: done"]);
    let run = harness()
        .run(&[scripted("late", "PT20S"), scripted("early", "PT20S")], probe)
        .await
        .unwrap();

    let keys: Vec<_> = run.report.outcomes.iter().map(|o| o.key.to_string()).collect();
    assert_eq!(keys, vec!["scripted_0", "scripted_1"], "F009 FALSIFIED: order changed");
}

/// F010: Probe error text surfaces as detail while checking, never as failure
///
/// # Falsification Attempt
/// Script only errors and verify the final state is a timeout.
#[tokio::test(start_paused = true)]
async fn f010_persistent_probe_error_is_timeout() {
    let probe = ScriptedProbe::new().script_readings(
        "s",
        vec![Err(ProbeError::UnexpectedOutput("No value set!".into()))],
    );
    let run = harness().run(&[scripted("s", "PT1S")], probe).await.unwrap();
    assert_eq!(
        run.outcome("scripted_0").unwrap().state,
        WaitState::TimedOut,
        "F010 FALSIFIED: probe error ended the policy"
    );
}
