//! Integration tests for CLI argument handling
//!
//! Tests flag parsing and the fatal missing-secret startup path against the
//! compiled binary.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_porthole"))
        .env_remove("PORTHOLE_SIGNATURE_SECRET")
        .args(args)
        .output()
        .expect("Failed to execute porthole")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("porthole"), "Help should mention porthole");
    assert!(stdout.contains("warm"), "Help should mention --warm flag");
    assert!(stdout.contains("base-url"), "Help should mention --base-url");
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(
        output.status.success(),
        "Expected --version to exit successfully"
    );
}

#[test]
fn test_unknown_flag_fails() {
    let output = run_cli(&["--secret", "oops"]);
    assert!(
        !output.status.success(),
        "Unknown flags should be rejected by clap"
    );
}

#[test]
fn test_missing_signing_secret_is_fatal() {
    // No PORTHOLE_SIGNATURE_SECRET in the environment: startup must stop
    // before any terminal or network activity.
    let output = run_cli(&["--warm"]);
    assert!(
        !output.status.success(),
        "Missing secret should be a fatal startup error"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("signing secret"),
        "Error should name the missing secret: {}",
        stderr
    );
}
