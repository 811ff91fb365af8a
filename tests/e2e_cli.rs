//! CLI end-to-end tests
//!
//! Tests for the docpress command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the docpress binary
fn docpress_cmd() -> Command {
    Command::cargo_bin("docpress").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = docpress_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = docpress_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_check_tools() {
    // check-tools succeeds whether or not LibreOffice is installed; it is a
    // report, not a gate.
    let mut cmd = docpress_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("soffice"));
}

#[test]
fn test_cli_validate_defaults() {
    let mut cmd = docpress_cmd();
    cmd.arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"));
}

#[test]
fn test_cli_validate_written_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("docpress.toml");
    std::fs::write(&path, "[server]\nport = 3000\n").unwrap();

    let mut cmd = docpress_cmd();
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_cli_validate_rejects_broken_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("docpress.toml");
    std::fs::write(&path, "[server]\nport = 0\n").unwrap();

    let mut cmd = docpress_cmd();
    cmd.arg("validate").arg(&path).assert().failure();
}

#[test]
fn test_cli_convert_missing_input() {
    let mut cmd = docpress_cmd();
    cmd.args(["convert", "/nonexistent/report.docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
