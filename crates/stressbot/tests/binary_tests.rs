// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Tests that run the stressbot binary
//!
//! These cover environment fallbacks, stdin/file input and the JSON records
//! written to stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir)
        .join("../stressbot-parser/tests/fixtures")
        .join(name)
}

/// A stressbot command with the CI environment cleared
fn stressbot() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stressbot"));
    cmd.env_remove("PKG")
        .env_remove("BUILD_VCS_NUMBER")
        .env_remove("STRESSBOT_OWNER")
        .env_remove("STRESSBOT_REPO")
        .env_remove("RUST_LOG");
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn stressbot");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for stressbot")
}

fn json_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid JSON line"))
        .collect()
}

#[test]
fn test_post_reads_package_and_sha_from_env() {
    let mut cmd = stressbot();
    cmd.arg("post")
        .env("PKG", "foo/bar")
        .env("BUILD_VCS_NUMBER", "abc");
    let output = run_with_stdin(
        cmd,
        "=== RUN   TestA\nboom\n--- FAIL: TestA (0.00s)\nFAIL\n",
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let records = json_lines(&output.stdout);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["request"], "create_issue");
    assert_eq!(records[0]["owner"], "cockroachdb");
    assert_eq!(records[0]["repo"], "cockroach");
    assert_eq!(
        records[0]["issue"]["title"],
        "foo/bar: TestA failed under stress"
    );
    let body = records[0]["issue"]["body"].as_str().expect("body is a string");
    assert!(body.starts_with("SHA: https://github.com/cockroachdb/cockroach/commits/abc\n"));
    assert_eq!(records[1]["request"], "create_comment");
}

#[test]
fn test_post_owner_and_repo_from_env() {
    let mut cmd = stressbot();
    cmd.args(["post", "--input"])
        .arg(fixture_path("fatal.txt"))
        .env("PKG", "./storage")
        .env("BUILD_VCS_NUMBER", "abcd123")
        .env("STRESSBOT_OWNER", "acme")
        .env("STRESSBOT_REPO", "widgets");
    let output = cmd.output().expect("Failed to run stressbot");
    assert!(output.status.success());

    let records = json_lines(&output.stdout);
    assert_eq!(records[0]["owner"], "acme");
    assert_eq!(records[0]["repo"], "widgets");
    assert_eq!(
        records[0]["issue"]["title"],
        "./storage: TestRaftRemoveRace failed under stress"
    );
}

#[test]
fn test_post_without_package_fails() {
    let mut cmd = stressbot();
    cmd.args(["post", "--sha", "abc"]);
    let output = run_with_stdin(cmd, "");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_parse_from_input_file() {
    let mut cmd = stressbot();
    cmd.args(["parse", "--input"]).arg(fixture_path("subtests.txt"));
    let output = cmd.output().expect("Failed to run stressbot");
    assert!(output.status.success());

    let records = json_lines(&output.stdout);
    assert_eq!(records.len(), 6);
    assert_eq!(records[5]["final"], Value::Bool(true));
}

#[test]
fn test_parse_missing_input_file_fails() {
    let mut cmd = stressbot();
    cmd.args(["parse", "--input", "/nonexistent/path/12345"]);
    let output = cmd.output().expect("Failed to run stressbot");
    assert!(!output.status.success());
}
