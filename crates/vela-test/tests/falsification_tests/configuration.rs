//! Falsification Tests: Category C - Declaration Validation (F021-F030)
//!
//! # Toyota Way: Poka-Yoke (ポカヨケ)
//! Malformed declarations are rejected before any poller starts.

use std::time::Duration;

use vela_core::{PolicyKey, PolicyRegistry, PolicySpec, WaitConfig, WaitError, parse_iso8601};
use vela_test::{SCRIPTED, ScriptedProbe, TestError, WaitHarness, scripted, scripted_policy};

fn harness() -> WaitHarness {
    WaitHarness::builder().with_builtins().build().expect("harness")
}

fn config_error(err: TestError) -> WaitError {
    match err {
        TestError::Wait(e) if e.is_config() => e,
        other => panic!("expected configuration error, got {other}"),
    }
}

// =============================================================================
// F021-F025: Rejected before start
// =============================================================================

/// F021: Unknown type is rejected and the supported types are listed
///
/// # Falsification Attempt
/// Declare a type nobody registered.
#[tokio::test]
async fn f021_unknown_type_lists_supported() {
    let probe = ScriptedProbe::new();
    let err = harness()
        .run(&[PolicySpec::new("ssh_reachable")], probe.clone())
        .await
        .unwrap_err();

    let msg = config_error(err).to_string();
    assert!(msg.contains("\"ssh_reachable\" not supported yet"), "F021 FALSIFIED: {msg}");
    assert!(msg.contains(vela_policy::CLOUD_INIT_DONE), "F021 FALSIFIED: supported list missing");
    assert_eq!(probe.total_calls(), 0, "F021 FALSIFIED: probed before validation");
}

/// F022: A bad declaration anywhere stops every policy from starting
///
/// # Falsification Attempt
/// Valid first declaration, broken third.
#[tokio::test]
async fn f022_no_partial_start() {
    let probe = ScriptedProbe::new().script("s", &["status: done"]);
    let specs = [scripted("s", "PT1S"), scripted("s", "PT1S"), scripted("s", "PT1 second")];

    let err = harness().run(&specs, probe.clone()).await.unwrap_err();
    assert!(config_error(err).to_string().contains("scripted_2"));
    assert_eq!(probe.total_calls(), 0, "F022 FALSIFIED: earlier policy started");
}

/// F023: Missing type is a configuration error naming the position
///
/// # Falsification Attempt
/// Parse TOML whose second declaration has no type.
#[test]
fn f023_missing_type_in_toml() {
    let toml = r#"
[[creation_policy]]
type = "scripted"
property = "s"

[[creation_policy]]
timeout = "PT5S"
"#;
    let err = WaitConfig::from_toml_str(toml).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("#1"), "F023 FALSIFIED: {err}");
}

/// F024: Registering a type twice is refused
///
/// # Falsification Attempt
/// Register the scripted type on a registry that already has it.
#[test]
fn f024_duplicate_registration_refused() {
    let mut registry = PolicyRegistry::new();
    registry.register(SCRIPTED, scripted_policy).unwrap();
    let err = registry.register(SCRIPTED, scripted_policy).unwrap_err();
    assert!(err.is_config(), "F024 FALSIFIED: duplicate type accepted");
}

/// F025: Keys are `<type>_<index>` by declaration position
///
/// # Falsification Attempt
/// Mix types and check every key.
#[tokio::test(start_paused = true)]
async fn f025_keys_follow_position() {
    let probe = ScriptedProbe::new()
        .script("s", &["status: done"])
        .script(vela_policy::CLOUD_INIT_STATUS_PROPERTY, &["status: done"]);
    let specs = [
        scripted("s", "PT5S"),
        PolicySpec::new(vela_policy::CLOUD_INIT_DONE).with_timeout("PT5S"),
        scripted("s", "PT5S"),
    ];
    let run = harness().run(&specs, probe).await.unwrap();

    let keys: Vec<_> = run.report.outcomes.iter().map(|o| o.key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            PolicyKey::new("scripted_0"),
            PolicyKey::new("cloud_init_done_by_vm_guestproperty_1"),
            PolicyKey::new("scripted_2"),
        ],
        "F025 FALSIFIED: keys do not follow declaration order"
    );
}

// =============================================================================
// F026-F030: ISO-8601 durations and config files
// =============================================================================

/// F026: Common ISO-8601 forms parse to the expected duration
///
/// # Falsification Attempt
/// Table of known values.
#[test]
fn f026_iso8601_known_values() {
    let cases = [
        ("PT3M", Duration::from_secs(180)),
        ("PT2S", Duration::from_secs(2)),
        ("PT1H30M", Duration::from_secs(5400)),
        ("P1D", Duration::from_secs(86_400)),
        ("PT0.5S", Duration::from_millis(500)),
        ("P1DT1S", Duration::from_secs(86_401)),
    ];
    for (input, expected) in cases {
        assert_eq!(parse_iso8601(input).unwrap(), expected, "F026 FALSIFIED: {input}");
    }
}

/// F027: Malformed durations are rejected
///
/// # Falsification Attempt
/// Plain numbers, missing designators, designators out of order.
#[test]
fn f027_iso8601_malformed() {
    for input in ["", "3M", "P", "PT", "PT3", "PT1S1M", "P1H", "3 minutes"] {
        assert!(parse_iso8601(input).is_err(), "F027 FALSIFIED: accepted {input:?}");
    }
}

/// F028: Empty declaration list is vacuously ready
///
/// # Falsification Attempt
/// Run with no declarations.
#[tokio::test]
async fn f028_empty_is_ready() {
    let probe = ScriptedProbe::new();
    let run = harness().run(&[], probe.clone()).await.unwrap();
    assert!(run.report.is_ready(), "F028 FALSIFIED: empty set not ready");
    assert_eq!(probe.total_calls(), 0);
}

/// F029: The configured safety buffer reaches the engine
///
/// # Falsification Attempt
/// Parse a custom buffer and compare.
#[test]
fn f029_safety_buffer_parsed() {
    let config = WaitConfig::from_toml_str("safety_buffer = \"10s\"").unwrap();
    assert_eq!(config.safety_buffer, Duration::from_secs(10), "F029 FALSIFIED");
}

/// F030: Type-specific fields are passed through untouched
///
/// # Falsification Attempt
/// Extra keys in TOML must be visible to the constructor.
#[test]
fn f030_extra_fields_preserved() {
    let toml = r#"
[[creation_policy]]
type = "guest_property_equals"
property = "/VirtualBox/GuestInfo/Net/0/Status"
expected = "Up"
failure_values = ["Down"]
"#;
    let config = WaitConfig::from_toml_str(toml).unwrap();
    let spec = &config.creation_policy[0];
    assert_eq!(spec.fields.len(), 3, "F030 FALSIFIED: fields lost");
    assert_eq!(spec.fields["expected"], serde_json::json!("Up"));
}
