//! Integration tests for the `revogi` CLI binary.
//!
//! These cover argument parsing, help output, completions, config handling
//! and credential errors, all without reaching the relay.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `revogi` binary with env isolation.
///
/// Clears all `REVOGI_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn revogi_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("revogi");
    cmd.env("HOME", "/tmp/revogi-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/revogi-cli-test-nonexistent")
        .env_remove("REVOGI_CONFIG")
        .env_remove("REVOGI_USERNAME")
        .env_remove("REVOGI_PASSWORD")
        .env_remove("REVOGI_API_URL")
        .env_remove("REVOGI_OUTPUT")
        .env_remove("REVOGI_INSECURE")
        .env_remove("REVOGI_MAX_RETRIES")
        .env_remove("REVOGI_COOLDOWN")
        .env_remove("REVOGI_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn config_file(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = revogi_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    revogi_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Revogi")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("power"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    revogi_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("revogi"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    revogi_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("revogi"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_power_rejects_port_zero() {
    let output = revogi_cmd()
        .args(["power", "SWW1", "0", "on"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_power_rejects_unknown_state() {
    let output = revogi_cmd()
        .args(["power", "SWW1", "1", "toggle"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_stats_requires_serial() {
    let output = revogi_cmd().arg("stats").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");

    revogi_cmd()
        .args(["config", "path", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_show_redacts_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = config_file(
        &dir,
        r#"
username = "me@example.com"
password = "hunter2"
"#,
    );

    revogi_cmd()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("me@example.com")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_config_show_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = config_file(&dir, "poll_interval = 0\n");

    let output = revogi_cmd()
        .args(["config", "show", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("poll_interval"));
}

#[test]
fn test_config_init_keeps_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let original = "poll_interval = 0\n\n[devices.SWW1]\nalias = \"desk\"\n";
    let path = config_file(&dir, original);

    let output = revogi_cmd()
        .args(["config", "init", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("poll_interval"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

// ── Credentials ─────────────────────────────────────────────────────

#[test]
fn test_devices_without_username_is_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = config_file(&dir, "");

    let output = revogi_cmd()
        .args(["devices", "list", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected auth exit code");
    assert!(combined_output(&output).contains("No credentials"));
}

#[test]
fn test_invalid_api_url_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = config_file(&dir, "username = \"me@example.com\"\n");

    let output = revogi_cmd()
        .args(["login", "--api-url", "not a url", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("api_url"));
}
