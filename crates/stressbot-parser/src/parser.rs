// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Streaming parser for `go test -v` output
//!
//! The parser keeps an explicit stack of open test contexts with the unnamed
//! root at the bottom. A `=== RUN` line pushes a context; an end marker, a data
//! race warning or a package summary pops the innermost one and hands it to the
//! consumer. Every other line is appended to the innermost context, so output
//! captured by a subtest is never visible to its parent.
//!
//! # Example
//!
//! ```
//! use stressbot_parser::parse_output;
//!
//! let run = parse_output(
//!     "=== RUN   TestA\n=== RUN   TestA/b\n--- PASS: TestA/b (0.00s)\n--- FAIL: TestA (0.01s)\n",
//! )
//! .unwrap();
//! assert_eq!(run.tests.len(), 2);
//! assert_eq!(run.tests[0].name, "TestA/b");
//! assert_eq!(run.failing_tests().len(), 1);
//! ```

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::ParseError;
use crate::grammar::{EndStatus, Line, classify};
use crate::result::TestResult;

// ============================================================================
// Options
// ============================================================================

/// Options controlling end-of-stream handling
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Emit contexts still open at end of input as non-terminal results
    ///
    /// When disabled, tests truncated by the end of the stream are dropped
    /// and only the root is emitted.
    pub flush_unterminated: bool,
}

impl ParseOptions {
    /// Options that emit truncated tests before the terminal emission
    #[must_use]
    pub fn flush_unterminated() -> Self {
        Self {
            flush_unterminated: true,
        }
    }
}

// ============================================================================
// Push parser
// ============================================================================

/// Contexts still open when the input ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remainder {
    /// Named tests that never closed, innermost first
    pub unterminated: Vec<TestResult>,
    /// The root context
    pub root: TestResult,
}

/// A push parser fed one line at a time
#[derive(Debug, Clone)]
pub struct StreamParser {
    // Never empty: index 0 is the root.
    stack: Vec<TestResult>,
}

impl StreamParser {
    /// Create a parser with only the root context open
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![TestResult::root()],
        }
    }

    /// Number of open named tests
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// The innermost open context
    #[must_use]
    pub fn current(&self) -> &TestResult {
        &self.stack[self.stack.len() - 1]
    }

    fn current_mut(&mut self) -> &mut TestResult {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Pop the innermost context, unless it is the root
    fn close(&mut self) -> Option<TestResult> {
        if self.depth() == 0 {
            return None;
        }
        let closed = self.stack.pop();
        if let Some(test) = &closed {
            debug!(test = %test.name, depth = self.depth(), outcome = ?test.outcome(), "Closed test");
        }
        closed
    }

    /// Process a single line of output
    ///
    /// Returns the test closed by this line, if any.
    ///
    /// A data race warning or a package summary seen while only the root is
    /// open is recorded on the root but does not close it, so the terminal
    /// emission still happens at the real end of the input. On the root,
    /// `fail` therefore means "a package summary was seen", even when that
    /// summary reported `ok`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MismatchedBoundary` if an end marker names a test
    /// other than the innermost open one.
    pub fn push_line(&mut self, line: &str) -> Result<Option<TestResult>, ParseError> {
        let classified = classify(line);
        if classified.is_boundary() {
            trace!(line, "Boundary line");
        }

        match classified {
            Line::Run { name } => {
                self.stack.push(TestResult::named(name));
                debug!(test = name, depth = self.depth(), "Opened test");
                Ok(None)
            }
            Line::End { status, name, .. } => {
                let current = self.current_mut();
                if current.name != name {
                    warn!(expected = %current.name, found = name, "Mismatched test boundary");
                    return Err(ParseError::MismatchedBoundary {
                        expected: current.name.clone(),
                        found: name.to_string(),
                    });
                }
                match status {
                    EndStatus::Pass => current.pass = true,
                    EndStatus::Skip => current.skip = true,
                    EndStatus::Fail => current.fail = true,
                }
                Ok(self.close())
            }
            Line::Race => {
                self.current_mut().race = true;
                Ok(self.close())
            }
            Line::Summary { package, .. } => {
                debug!(package, depth = self.depth(), "Package summary");
                self.current_mut().fail = true;
                Ok(self.close())
            }
            Line::Output(text) => {
                self.current_mut().output.push(text.to_string());
                Ok(None)
            }
        }
    }

    /// Finish parsing, returning every context still open
    #[must_use]
    pub fn finish(mut self) -> Remainder {
        let mut unterminated = Vec::with_capacity(self.depth());
        while self.depth() > 0 {
            if let Some(test) = self.stack.pop() {
                warn!(test = %test.name, "Test output ended before the test finished");
                unterminated.push(test);
            }
        }
        let root = self.stack.pop().unwrap_or_default();
        Remainder { unterminated, root }
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Driving the parser from a reader
// ============================================================================

/// Parse test output from `reader`, invoking `on_test` for each result
///
/// `on_test` receives every completed test with `last == false`, in input
/// order, and then the root context exactly once with `last == true`.
///
/// # Errors
///
/// Returns the first error produced by `on_test`, a converted
/// `ParseError::MismatchedBoundary`, or a converted `ParseError::Io` if the
/// reader fails. A read failure is reported only after the terminal emission.
pub fn for_each_test<R, F, E>(reader: R, on_test: F) -> Result<(), E>
where
    R: BufRead,
    F: FnMut(TestResult, bool) -> Result<(), E>,
    E: From<ParseError>,
{
    for_each_test_with(reader, &ParseOptions::default(), on_test)
}

/// Like [`for_each_test`], with explicit options
///
/// # Errors
///
/// See [`for_each_test`].
pub fn for_each_test_with<R, F, E>(
    mut reader: R,
    options: &ParseOptions,
    mut on_test: F,
) -> Result<(), E>
where
    R: BufRead,
    F: FnMut(TestResult, bool) -> Result<(), E>,
    E: From<ParseError>,
{
    let mut parser = StreamParser::new();
    let mut buf = Vec::new();
    let mut lines = 0usize;

    let read_error = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break None,
            Ok(_) => {
                lines += 1;
                let line = String::from_utf8_lossy(trim_line_ending(&buf));
                if let Some(test) = parser.push_line(&line)? {
                    on_test(test, false)?;
                }
            }
            Err(e) => {
                warn!(error = %e, line = lines, "Failed to read test output");
                // Bytes read before the failure still form a final line
                if !buf.is_empty() {
                    let line = String::from_utf8_lossy(trim_line_ending(&buf));
                    if let Some(test) = parser.push_line(&line)? {
                        on_test(test, false)?;
                    }
                }
                break Some(e);
            }
        }
    };

    let remainder = parser.finish();
    if options.flush_unterminated {
        for test in remainder.unterminated {
            on_test(test, false)?;
        }
    }
    debug!(lines, "Reached end of test output");
    on_test(remainder.root, true)?;

    match read_error {
        Some(e) => Err(ParseError::Io(e).into()),
        None => Ok(()),
    }
}

/// Strip a trailing `\n` or `\r\n`
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

// ============================================================================
// Collected results
// ============================================================================

/// Every emission of a completed parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRun {
    /// Completed tests, in emission order
    pub tests: Vec<TestResult>,
    /// The root context
    pub root: TestResult,
}

impl ParsedRun {
    /// Tests that failed or raced
    #[must_use]
    pub fn failing_tests(&self) -> Vec<&TestResult> {
        self.tests.iter().filter(|t| t.is_failure()).collect()
    }

    /// Number of passed tests
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.tests.iter().filter(|t| t.pass).count()
    }

    /// Number of failed tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.tests.iter().filter(|t| t.fail).count()
    }

    /// Number of skipped tests
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.tests.iter().filter(|t| t.skip).count()
    }

    /// Number of tests with a data race
    #[must_use]
    pub fn raced_count(&self) -> usize {
        self.tests.iter().filter(|t| t.race).count()
    }
}

/// Parse complete test output held in memory
///
/// # Errors
///
/// Returns `ParseError::MismatchedBoundary` if the test nesting is broken.
pub fn parse_output(output: &str) -> Result<ParsedRun, ParseError> {
    let mut tests = Vec::new();
    let mut root = TestResult::root();
    for_each_test(output.as_bytes(), |test, last| {
        if last {
            root = test;
        } else {
            tests.push(test);
        }
        Ok::<_, ParseError>(())
    })?;
    Ok(ParsedRun { tests, root })
}
