//! Smoke tests for the certward binary.
//!
//! Anything past argument parsing needs root, so those tests check whichever
//! behaviour applies to the user running them.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn certward() -> Command {
    let mut cmd = Command::cargo_bin("certward").expect("binary built");
    cmd.env_remove("CERTWARD_CONFIG").env("CERTWARD_LOG", "warn");
    cmd
}

fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// A config file keeping every directory inside `root`.
fn write_config(root: &Path) -> std::path::PathBuf {
    let path = root.join("cli.toml");
    fs::write(
        &path,
        format!(
            "server = \"mock://ca\"\n\n[dirs]\nconfig_dir = \"{}\"\nwork_dir = \"{}\"\n",
            root.join("etc").display(),
            root.join("work").display()
        ),
    )
    .unwrap();
    path
}

#[test]
fn help_lists_flags() {
    certward()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--domains"))
        .stdout(predicate::str::contains("--rollback"))
        .stdout(predicate::str::contains("--view-config-changes"));
}

#[test]
fn version_prints_name() {
    certward()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("certward "));
}

#[test]
fn completions_work_without_root() {
    certward()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("certward"));
}

#[test]
fn conflicting_redirect_flags_rejected() {
    certward()
        .args(["--redirect", "--no-redirect"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn view_config_changes_needs_root() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let assert = certward()
        .arg("--config")
        .arg(&config)
        .args(["--non-interactive", "--view-config-changes"])
        .assert();

    if is_root() {
        assert
            .success()
            .stdout(predicate::str::contains("No configuration changes have been recorded."));
    } else {
        assert
            .code(1)
            .stderr(predicate::str::contains("Root is required to run certward"));
    }
}

#[test]
fn revoke_is_not_available() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let assert = certward()
        .arg("--config")
        .arg(&config)
        .args(["--non-interactive", "--revoke"])
        .assert();

    if is_root() {
        assert
            .success()
            .stdout(predicate::str::contains("Revocation is not available yet."));
    } else {
        assert.code(1);
    }
}

#[test]
fn missing_explicit_config_fails() {
    if !is_root() {
        return;
    }
    let temp = TempDir::new().unwrap();

    certward()
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .args(["--non-interactive", "-v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}
