// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subcommand implementations
//!
//! Each command takes its input and output streams explicitly so the binary
//! can wire them to stdin/stdout and tests can use in-memory buffers.

use std::io::{BufRead, Write};

use serde::Serialize;
use tracing::info;

use stressbot_parser::{ParseError, ParseOptions, TestResult, for_each_test_with};

use crate::poster::{IssuePoster, PostSummary, ReportError, Repository, post_failures};
use crate::tracker::DryRun;
use crate::trigger::{StressPlan, TriggerError, read_packages};

/// Errors from the `parse` command
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The test output could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error writing a record
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error serializing a record
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line of `parse` output
#[derive(Debug, Serialize)]
struct Emission<'a> {
    #[serde(rename = "final")]
    last: bool,
    test: &'a TestResult,
}

/// Print every parser emission as a JSON line
///
/// # Errors
///
/// Returns `CommandError` if parsing or writing fails.
pub fn run_parse<R: BufRead, W: Write>(
    reader: R,
    mut out: W,
    options: &ParseOptions,
) -> Result<usize, CommandError> {
    let mut tests = 0;
    for_each_test_with(reader, options, |test, last| {
        if !last {
            tests += 1;
        }
        serde_json::to_writer(&mut out, &Emission { last, test: &test })?;
        out.write_all(b"\n")?;
        Ok::<_, CommandError>(())
    })?;
    out.flush()?;
    info!(tests, "Parsed test output");
    Ok(tests)
}

/// File issues for failures, recording tracker requests to `out`
///
/// # Errors
///
/// Returns `ReportError` if parsing or posting fails.
pub fn run_post<R: BufRead, W: Write>(
    reader: R,
    out: W,
    repository: Repository,
    package: &str,
    sha: &str,
) -> Result<PostSummary, ReportError> {
    let mut poster = IssuePoster::new(DryRun::new(out), repository, package, sha);
    post_failures(reader, &mut poster)
}

/// Queue stress builds, recording build requests to `out`
///
/// When `packages` is empty the package list is read from `reader`.
///
/// # Errors
///
/// Returns `TriggerError` if reading the package list or queueing fails.
pub fn run_trigger<R: BufRead, W: Write>(
    reader: R,
    out: W,
    build: &str,
    branch: &str,
    goflags: &[String],
    packages: &[String],
) -> Result<usize, TriggerError> {
    let packages = if packages.is_empty() {
        read_packages(reader)?
    } else {
        packages.to_vec()
    };

    let mut plan = StressPlan::new(build, branch).with_packages(packages);
    if !goflags.is_empty() {
        plan = plan.with_goflags(goflags.iter().cloned());
    }

    let queued = plan.queue_all(&mut DryRun::new(out))?;
    info!(builds = queued.len(), "Queued stress builds");
    Ok(queued.len())
}
