//! Integration tests for the `taskdate` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise each subcommand
//! through the actual binary, including JSON output, environment defaults and
//! error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: the binary with logging env cleared so stderr stays predictable.
fn taskdate() -> Command {
    let mut cmd = Command::cargo_bin("taskdate").unwrap();
    cmd.env_remove("TASKDATE_LOG").env_remove("TASKDATE_NOW");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// next
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn next_prints_single_date() {
    taskdate()
        .args(["next", "--now", "20240305", "--date", "20240301", "--repeat", "w 1,3"])
        .assert()
        .success()
        .stdout("20240306\n");
}

#[test]
fn next_reads_now_from_env() {
    taskdate()
        .env("TASKDATE_NOW", "20240201")
        .args(["next", "--date", "20240115", "--repeat", "m -1"])
        .assert()
        .success()
        .stdout("20240229\n");
}

#[test]
fn next_count_prints_one_date_per_line() {
    taskdate()
        .args([
            "next", "--now", "20240229", "--date", "20240229", "--repeat", "y", "--count", "3",
        ])
        .assert()
        .success()
        .stdout("20250301\n20260301\n20270301\n");
}

#[test]
fn next_json_matches_api_shape() {
    let output = taskdate()
        .args([
            "next", "--now", "20240131", "--date", "20240131", "--repeat", "d 1", "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!({ "next_date": "20240201" }));
}

#[test]
fn next_json_with_count_lists_occurrences() {
    let output = taskdate()
        .args([
            "next", "--now", "20240305", "--date", "20240301", "--repeat", "w 1,3", "--count",
            "2", "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "occurrences": ["20240306", "20240311"] })
    );
}

#[test]
fn next_rejects_bad_rule() {
    taskdate()
        .args(["next", "--now", "20240101", "--date", "20240101", "--repeat", "d 0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn next_rejects_empty_rule() {
    taskdate()
        .args(["next", "--now", "20240101", "--date", "20240101", "--repeat", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Empty recurrence rule"));
}

#[test]
fn next_count_rejects_empty_rule() {
    taskdate()
        .args([
            "next", "--now", "20240101", "--date", "20240101", "--repeat", "", "--count", "3",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Empty recurrence rule"));
}

#[test]
fn next_count_from_future_monthly_anchor() {
    taskdate()
        .args([
            "next", "--now", "20240101", "--date", "20240601", "--repeat", "m 15", "--count", "2",
        ])
        .assert()
        .success()
        .stdout("20240615\n20240715\n");
}

#[test]
fn next_rejects_bad_anchor_date() {
    taskdate()
        .args(["next", "--now", "20240101", "--date", "20240230", "--repeat", "y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn next_rejects_bad_now_at_parse_time() {
    taskdate()
        .args(["next", "--now", "2024-01-01", "--date", "20240101", "--repeat", "y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--now"));
}

#[test]
fn next_rejects_zero_count() {
    taskdate()
        .args([
            "next", "--now", "20240101", "--date", "20240101", "--repeat", "y", "--count", "0",
        ])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_prints_canonical_rule() {
    taskdate()
        .args(["check", "m 15,-1 12,1"])
        .assert()
        .success()
        .stdout("m -1,15 1,12\n");
}

#[test]
fn check_rejects_malformed_rule() {
    taskdate()
        .args(["check", "w 1,,2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid rule format"));
}

// ─────────────────────────────────────────────────────────────────────────────
// normalize / done
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn normalize_past_task_without_rule_moves_to_today() {
    taskdate()
        .args(["normalize", "--today", "20240305", "--date", "20240101"])
        .assert()
        .success()
        .stdout("20240305\n");
}

#[test]
fn normalize_past_recurring_task_moves_to_today() {
    taskdate()
        .args([
            "normalize", "--today", "20240305", "--date", "20240301", "--repeat", "d 3",
        ])
        .assert()
        .success()
        .stdout("20240305\n");
}

#[test]
fn normalize_still_validates_the_rule() {
    taskdate()
        .args([
            "normalize", "--today", "20240305", "--date", "20240301", "--repeat", "w 8",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn done_reschedules_recurring_task() {
    taskdate()
        .args(["done", "--today", "20240305", "--date", "20240305", "--repeat", "w 1,3"])
        .assert()
        .success()
        .stdout("20240306\n");
}

#[test]
fn done_retires_one_off_task() {
    taskdate()
        .args(["done", "--today", "20240305", "--date", "20240305"])
        .assert()
        .success()
        .stdout("retire\n");
}

#[test]
fn done_json_output() {
    taskdate()
        .args([
            "done", "--today", "20240305", "--date", "20240305", "--repeat", "d 1", "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""action":"reschedule""#))
        .stdout(predicate::str::contains(r#""date":"20240306""#));
}

// ─────────────────────────────────────────────────────────────────────────────
// logging
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn verbose_logs_to_stderr_not_stdout() {
    taskdate()
        .args([
            "-v", "next", "--now", "20240305", "--date", "20240301", "--repeat", "w 1,3",
        ])
        .assert()
        .success()
        .stdout("20240306\n")
        .stderr(predicate::str::contains("computing next date"));
}

#[test]
fn no_subcommand_shows_usage() {
    taskdate()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
