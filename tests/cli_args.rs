//! Integration tests for CLI argument handling
//!
//! Tests subcommand parsing and argument validation from the command line.
//! Everything here runs offline: either the argument parsing fails before
//! any client is built, or input validation fails before any request.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tsuki-providers"))
        .args(args)
        .output()
        .expect("Failed to execute tsuki-providers")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("tsuki-providers"),
        "Help should mention tsuki-providers"
    );
    assert!(stdout.contains("status"), "Help should list the status subcommand");
    assert!(stdout.contains("color"), "Help should list the color subcommand");
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(
        !output.status.success(),
        "Expected bare invocation to fail with usage"
    );
}

#[test]
fn test_unknown_subcommand_fails() {
    let output = run_cli(&["frobnicate"]);
    assert!(!output.status.success(), "Expected unknown subcommand to fail");
}

#[test]
fn test_invalid_feed_kind_prints_error_and_exits() {
    let output = run_cli(&["feed", "someone", "--kind", "not_a_kind"]);
    assert!(!output.status.success(), "Expected invalid feed kind to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid feed kind") || stderr.contains("invalid"),
        "Should print error message about invalid feed kind: {}",
        stderr
    );
}

#[test]
fn test_invalid_hex_color_fails_without_network() {
    // Input validation rejects the argument before any request is issued,
    // so this must fail fast even with no network access.
    let output = run_cli(&["color", "not-a-color"]);
    assert!(!output.status.success(), "Expected invalid hex to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not a hex color"),
        "Should print the validation message: {}",
        stderr
    );
}

#[test]
fn test_song_without_url_or_triple_fails_without_network() {
    let output = run_cli(&["song"]);
    assert!(
        !output.status.success(),
        "Expected empty song query to fail validation"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("platform/type/id") || stderr.contains("url"),
        "Should print the validation message: {}",
        stderr
    );
}

#[test]
fn test_status_requires_a_host() {
    let output = run_cli(&["status"]);
    assert!(!output.status.success(), "Expected status with no hosts to fail");
}
