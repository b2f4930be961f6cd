//! Integration tests for the `swmgr` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! config management and error handling without a live SNMP agent.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `swmgr` binary with env isolation.
///
/// Clears all `SWMGR_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn swmgr_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("swmgr");
    cmd.env("HOME", "/tmp/swmgr-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/swmgr-cli-test-nonexistent")
        .env_remove("SWMGR_CONFIG")
        .env_remove("SWMGR_DEVICE")
        .env_remove("SWMGR_HOST")
        .env_remove("SWMGR_COMMUNITY")
        .env_remove("SWMGR_PORT")
        .env_remove("SWMGR_TIMEOUT")
        .env_remove("SWMGR_OUTPUT");
    cmd
}

/// Same as [`swmgr_cmd`] with `--config` pointing at `path`.
fn swmgr_with_config(path: &Path) -> assert_cmd::Command {
    let mut cmd = swmgr_cmd();
    cmd.arg("--config").arg(path);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = swmgr_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    swmgr_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("SNMP")
            .and(predicate::str::contains("interfaces"))
            .and(predicate::str::contains("set-alias"))
            .and(predicate::str::contains("rules")),
    );
}

#[test]
fn test_version_flag() {
    swmgr_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("swmgr"));
}

#[test]
fn test_invalid_output_format() {
    let output = swmgr_cmd()
        .args(["--output", "xml", "rules"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    swmgr_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    swmgr_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("swmgr"));
}

// ── Rules ───────────────────────────────────────────────────────────

#[test]
fn test_rules_lists_builtin_ids() {
    swmgr_cmd()
        .args(["rules", "--output", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("cisco_physical_ports")
                .and(predicate::str::contains("mikrotik_bonds"))
                .and(predicate::str::contains("gigabit_ethernet")),
        );
}

#[test]
fn test_rules_vendor_filter_json() {
    let output = swmgr_cmd()
        .args(["rules", "--vendor", "zyxel", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rules: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let vendors: Vec<&str> = rules
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r.get("vendor").and_then(|v| v.as_str()))
        .collect();
    assert!(!vendors.is_empty());
    assert!(vendors.iter().all(|v| *v == "zyxel"));
}

#[test]
fn test_rules_unknown_vendor_is_usage_error() {
    let output = swmgr_cmd()
        .args(["rules", "--vendor", "juniper"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config management ───────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swmgr.toml");
    swmgr_with_config(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("swmgr.toml"));
}

#[test]
fn test_config_device_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    swmgr_with_config(&path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    // A second init without --force refuses to overwrite.
    let output = swmgr_with_config(&path)
        .args(["config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    swmgr_with_config(&path)
        .args([
            "config",
            "add-device",
            "core",
            "--host",
            "10.0.0.2",
            "--community",
            "s3cret",
            "--display-name",
            "Core Switch",
            "--oid",
            "firmware=.1.3.6.1.4.1.890.1.15.3.1.6.0",
        ])
        .assert()
        .success();

    swmgr_with_config(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[devices.core]")
                .and(predicate::str::contains("Core Switch"))
                .and(predicate::str::contains("1.3.6.1.4.1.890.1.15.3.1.6.0"))
                .and(predicate::str::contains("s3cret").not()),
        );

    swmgr_with_config(&path)
        .args(["config", "remove-device", "core"])
        .assert()
        .success();

    let output = swmgr_with_config(&path)
        .args(["config", "remove-device", "core"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_add_device_rejects_bad_oid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let output = swmgr_with_config(&path)
        .args([
            "config",
            "add-device",
            "lab",
            "--host",
            "10.0.0.9",
            "--oid",
            "model=1.3.six",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!path.exists());
}

// ── Device targeting ────────────────────────────────────────────────

#[test]
fn test_no_devices_configured() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let output = swmgr_with_config(&path).arg("interfaces").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("add-device"), "Expected help text:\n{text}");
}

#[test]
fn test_unknown_device_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[devices.core]\nhost = \"10.0.0.2\"\n").unwrap();
    let output = swmgr_with_config(&path)
        .args(["--device", "edge", "identity"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_write_needs_single_device() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[devices.a]\nhost = \"10.0.0.2\"\n\n[devices.b]\nhost = \"10.0.0.3\"\n",
    )
    .unwrap();
    let output = swmgr_with_config(&path)
        .args(["set-alias", "3", "uplink"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_set_admin_rejects_testing() {
    let output = swmgr_cmd()
        .args(["--host", "10.0.0.2", "set-admin", "3", "testing"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
