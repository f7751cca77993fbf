// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test result types

use serde::{Deserialize, Serialize};

/// One test context: a named test, or the unnamed root of the stream
///
/// The flags are independent. `race` may be set together with one of
/// `fail`, `skip` or `pass`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test name; empty for the root context
    pub name: String,
    /// Raw lines captured while this context was open, in input order
    pub output: Vec<String>,
    /// A data race was reported inside this test
    pub race: bool,
    /// The test failed, or was cut short by a package summary
    ///
    /// On the root this only records that a package summary line was seen,
    /// whether it reported `ok` or `FAIL`.
    pub fail: bool,
    /// The test was skipped
    pub skip: bool,
    /// The test passed
    pub pass: bool,
}

/// Summary of the outcome flags of a [`TestResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Skipped,
    /// A data race ended the test without another outcome
    Raced,
    /// No outcome was recorded
    Unfinished,
}

impl TestResult {
    /// Create the root context
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a fresh context for the named test
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether this is the unnamed root context
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// Whether the result should be reported as a failure
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.fail || self.race
    }

    /// Collapse the flags into a single outcome
    ///
    /// `fail` takes precedence over `race` when both are set.
    #[must_use]
    pub fn outcome(&self) -> TestOutcome {
        if self.fail {
            TestOutcome::Failed
        } else if self.race {
            TestOutcome::Raced
        } else if self.skip {
            TestOutcome::Skipped
        } else if self.pass {
            TestOutcome::Passed
        } else {
            TestOutcome::Unfinished
        }
    }
}
