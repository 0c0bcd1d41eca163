//! Smoke tests for the shopwright CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the shopwright binary
fn shopwright() -> Command {
    let mut cmd = Command::cargo_bin("shopwright").expect("shopwright binary should exist");
    for var in [
        "SHOPWRIGHT_CONFIG",
        "SHOPWRIGHT_BASE_URL",
        "SHOPWRIGHT_HEADLESS",
        "SHOPWRIGHT_TIMEOUT",
        "SHOPWRIGHT_RETRIES",
        "SHOPWRIGHT_THREADS",
        "SHOPWRIGHT_REPORT_DIR",
        "SHOPWRIGHT_DRIVER",
        "SHOPWRIGHT_LOG_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    shopwright()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    shopwright()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demoblaze"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_no_args_fails() {
    shopwright().assert().failure();
}

#[test]
fn test_run_subcommand_help() {
    shopwright()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("--driver"));
}

// ============================================================================
// list / config
// ============================================================================

#[test]
fn test_list_shows_scenarios() {
    shopwright()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("purchase_samsung_galaxy_s6"))
        .stdout(predicate::str::contains("Demoblaze / Purchase / blocker"))
        .stdout(predicate::str::contains("profile_survives_reload"));
}

#[test]
fn test_list_filter() {
    shopwright()
        .args(["list", "--filter", "login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid_login"))
        .stdout(predicate::str::contains("profile_clear").not());
}

#[test]
fn test_config_defaults() {
    shopwright()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://www.demoblaze.com/"))
        .stdout(predicate::str::contains("timeout_seconds: 10"));
}

#[test]
fn test_config_file_and_env_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("suite.properties");
    fs::write(&path, "base.url=https://demo.test/\nretry.count=2\n").unwrap();

    shopwright()
        .args(["config", "--config"])
        .arg(&path)
        .env("SHOPWRIGHT_THREADS", "3")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://demo.test/"))
        .stdout(predicate::str::contains("retry_count: 2"))
        .stdout(predicate::str::contains("thread_count: 3"));
}

#[test]
fn test_config_missing_file() {
    shopwright()
        .args(["config", "--config", "/nonexistent/shopwright.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_invalid_threads_rejected() {
    shopwright()
        .args(["config", "--threads", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("thread_count"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_profile_scenarios_writes_reports() {
    let dir = TempDir::new().unwrap();
    shopwright()
        .args(["-q", "--color", "never", "run", "--filter", "profile", "--timeout", "2"])
        .arg("--report-dir")
        .arg(dir.path())
        .assert()
        .success();

    let reports: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("ShopwrightReport_"))
        .collect();
    assert_eq!(reports.len(), 3, "reports: {reports:?}");
}

#[test]
fn test_run_json_logs() {
    let dir = TempDir::new().unwrap();
    shopwright()
        .args(["-v", "--log-format", "json", "--color", "never", "run"])
        .args(["--filter", "profile_clear", "--format", "json"])
        .arg("--report-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("\"level\":\"INFO\""));
}

#[test]
fn test_run_whole_suite() {
    let dir = TempDir::new().unwrap();
    shopwright()
        .args(["--color", "never", "run", "--timeout", "2", "-j", "4", "--format", "junit"])
        .arg("--report-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("PASSED"));
}

#[cfg(not(feature = "browser"))]
#[test]
fn test_chromium_driver_requires_feature() {
    shopwright()
        .args(["run", "--driver", "chromium"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--features browser"));
}
