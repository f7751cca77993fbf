// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line classification for `go test -v` output
//!
//! Every input line is matched against a small fixed grammar. The patterns are
//! tried in priority order and the first match wins:
//!
//! 1. `=== RUN <name>` opens a test
//! 2. `--- PASS|SKIP|FAIL: <name> (<secs>` closes the open test
//! 3. `WARNING: DATA RACE` at the start of a line
//! 4. `ok|FAIL <package> <secs>s` package summary at the start of a line
//!
//! Anything else, including lines that almost look like markers, is plain
//! output.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=== RUN\s+(\S+)").expect("run pattern is valid"));
static END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--- (PASS|SKIP|FAIL):\s+(\S+) \(([\d.]+)").expect("end pattern is valid")
});
static SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(ok|FAIL)\s+(\S+)\s+([\d.]+)s").expect("summary pattern is valid")
});
static RACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^WARNING: DATA RACE").expect("race pattern is valid"));

/// Outcome carried by an end marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndStatus {
    /// `--- PASS`
    Pass,
    /// `--- SKIP`
    Skip,
    /// `--- FAIL`
    Fail,
}

/// Outcome carried by a package summary line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryStatus {
    /// `ok`
    #[serde(rename = "ok")]
    Ok,
    /// `FAIL`
    #[serde(rename = "FAIL")]
    Fail,
}

/// A classified line of test runner output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Start of a named test
    Run {
        /// Test name
        name: &'a str,
    },
    /// End of a named test
    End {
        /// Reported outcome
        status: EndStatus,
        /// Test name
        name: &'a str,
        /// Elapsed seconds, as printed
        elapsed: &'a str,
    },
    /// Data race warning
    Race,
    /// Package-level summary
    Summary {
        /// Reported outcome
        status: SummaryStatus,
        /// Package import path
        package: &'a str,
        /// Elapsed seconds, as printed
        elapsed: &'a str,
    },
    /// Any other line
    Output(&'a str),
}

impl Line<'_> {
    /// Whether the line opens or closes a context
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        !matches!(self, Line::Output(_))
    }
}

/// Classify a single line of output
#[must_use]
pub fn classify(line: &str) -> Line<'_> {
    if let Some(caps) = RUN.captures(line) {
        if let Some(name) = caps.get(1) {
            return Line::Run {
                name: name.as_str(),
            };
        }
    }

    if let Some(caps) = END.captures(line) {
        if let (Some(status), Some(name), Some(elapsed)) = (caps.get(1), caps.get(2), caps.get(3))
        {
            let status = match status.as_str() {
                "PASS" => EndStatus::Pass,
                "SKIP" => EndStatus::Skip,
                _ => EndStatus::Fail,
            };
            return Line::End {
                status,
                name: name.as_str(),
                elapsed: elapsed.as_str(),
            };
        }
    }

    if RACE.is_match(line) {
        return Line::Race;
    }

    if let Some(caps) = SUMMARY.captures(line) {
        if let (Some(status), Some(package), Some(elapsed)) =
            (caps.get(1), caps.get(2), caps.get(3))
        {
            let status = match status.as_str() {
                "ok" => SummaryStatus::Ok,
                _ => SummaryStatus::Fail,
            };
            return Line::Summary {
                status,
                package: package.as_str(),
                elapsed: elapsed.as_str(),
            };
        }
    }

    Line::Output(line)
}
