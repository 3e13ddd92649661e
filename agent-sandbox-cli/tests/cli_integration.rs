//! End-to-end CLI tests driving the compiled `agent-sandbox` binary.
//!
//! These exercise the full boundary pipeline (flag parsing, config
//! discovery, policy compilation, bwrap assembly) through `--dry-run`, which
//! never actually spawns `bwrap`. They assume `bwrap` is present on `PATH`
//! and the process is not running as root, the same preconditions the
//! binary itself enforces before doing anything else.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("agent-sandbox").unwrap()
}

#[test]
fn dry_run_renders_rw_bind_for_cli_flag() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("project");
    std::fs::create_dir_all(&project).unwrap();

    cmd()
        .args([
            "--dry-run",
            "--rw",
            project.to_str().unwrap(),
            "--",
            "echo",
            "hi",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind-try"))
        .stdout(predicate::str::contains(project.to_str().unwrap()));
}

#[test]
fn dry_run_respects_no_network() {
    cmd()
        .args(["--dry-run", "--no-network", "--", "echo", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--share-net").not());
}

#[test]
fn empty_command_is_fatal() {
    cmd()
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no command"));
}

#[test]
fn missing_explicit_config_is_fatal() {
    cmd()
        .args([
            "--config",
            "/nonexistent/agent-sandbox-test-config.jsonc",
            "--dry-run",
            "--",
            "echo",
            "hi",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn check_flag_reports_outside_sandbox() {
    // Outside a sandbox created by this launcher, --check must exit 1 and
    // say so, never silently succeed.
    cmd()
        .arg("--check")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("outside sandbox"));
}

#[test]
fn invalid_cmd_flag_without_equals_is_fatal() {
    cmd()
        .args(["--cmd", "rm", "--dry-run", "--", "echo", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}
