// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Filing issues for failed stress tests
//!
//! [`IssuePoster`] is a consumer for the parser's callback stream. Every test
//! that neither passed nor was skipped gets its own issue carrying the test's
//! output. When the stream ends, each of those issues receives a comment with
//! the output that was not attributed to any test (build commands, seeds,
//! runner summaries).
//!
//! # Example
//!
//! ```
//! use stressbot::poster::{IssuePoster, Repository, post_failures};
//! use stressbot::tracker::DryRun;
//!
//! let output = "=== RUN   TestFoo\nboom\n--- FAIL: TestFoo (0.00s)\nFAIL\n";
//! let mut poster = IssuePoster::new(
//!     DryRun::new(Vec::new()),
//!     Repository::new("cockroachdb", "cockroach"),
//!     "github.com/cockroachdb/cockroach/storage",
//!     "abcd123",
//! );
//! let summary = post_failures(output.as_bytes(), &mut poster).unwrap();
//! assert_eq!(summary.issues_created, 1);
//! assert_eq!(summary.comments_posted, 1);
//! ```

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use stressbot_parser::{ParseError, TestResult, for_each_test};

use crate::tracker::{IssueComment, IssueRequest, IssueTracker, TrackerError};

/// Labels applied to every filed issue
pub const ISSUE_LABELS: [&str; 2] = ["Robot", "test-failure"];

const CODE_FENCE: &str = "```";

// ============================================================================
// Error Types
// ============================================================================

/// Errors while posting stress results
#[derive(Debug, Error)]
pub enum ReportError {
    /// The test output could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Filing an issue failed
    #[error("failed to create issue {title:?}: {source}")]
    CreateIssue {
        /// Title of the issue being filed
        title: String,
        /// Tracker error
        #[source]
        source: TrackerError,
    },

    /// Commenting on an issue failed
    #[error("failed to post run details on issue #{number}: {source}")]
    CreateComment {
        /// Issue being commented on
        number: u64,
        /// Tracker error
        #[source]
        source: TrackerError,
    },
}

// ============================================================================
// Poster
// ============================================================================

/// Repository that receives the issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Owning organization or user
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl Repository {
    /// Create a repository reference
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Link to the commit history at `sha`
    #[must_use]
    pub fn commits_url(&self, sha: &str) -> String {
        format!(
            "https://github.com/{}/{}/commits/{}",
            self.owner, self.name, sha
        )
    }
}

/// Counts from a finished posting run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Issues filed for failed tests
    pub issues_created: usize,
    /// Run-details comments posted
    pub comments_posted: usize,
}

/// Turns failed tests into issues on a tracker
pub struct IssuePoster<T> {
    tracker: T,
    repository: Repository,
    package: String,
    sha: String,
    issues: Vec<u64>,
    summary: PostSummary,
}

impl<T: IssueTracker> IssuePoster<T> {
    /// Create a poster for failures in `package` at commit `sha`
    #[must_use]
    pub fn new(
        tracker: T,
        repository: Repository,
        package: impl Into<String>,
        sha: impl Into<String>,
    ) -> Self {
        Self {
            tracker,
            repository,
            package: package.into(),
            sha: sha.into(),
            issues: Vec::new(),
            summary: PostSummary::default(),
        }
    }

    /// Issue numbers filed so far
    #[must_use]
    pub fn issues(&self) -> &[u64] {
        &self.issues
    }

    /// Counts so far
    #[must_use]
    pub fn summary(&self) -> PostSummary {
        self.summary
    }

    /// Consume the poster and return the tracker
    pub fn into_tracker(self) -> T {
        self.tracker
    }

    /// Handle one emission from the parser
    ///
    /// # Errors
    ///
    /// Returns `ReportError::CreateIssue` or `ReportError::CreateComment` if
    /// the tracker fails.
    pub fn handle(&mut self, test: TestResult, last: bool) -> Result<(), ReportError> {
        if last {
            return self.post_run_details(&test);
        }

        if test.pass || test.skip {
            debug!(test = %test.name, outcome = ?test.outcome(), "Ignoring test");
            return Ok(());
        }

        let request = self.issue_request(&test);
        let issue = self
            .tracker
            .create_issue(&self.repository.owner, &self.repository.name, &request)
            .map_err(|source| ReportError::CreateIssue {
                title: request.title.clone(),
                source,
            })?;
        info!(test = %test.name, number = issue.number, "Filed issue for failed test");

        self.issues.push(issue.number);
        self.summary.issues_created += 1;
        Ok(())
    }

    /// Build the issue for a failed test
    #[must_use]
    pub fn issue_request(&self, test: &TestResult) -> IssueRequest {
        let title = format!("{}: {} failed under stress", self.package, test.name);
        let body = format!(
            "SHA: {}\n\nStress build found a failed test:\n\n{}",
            self.repository.commits_url(&self.sha),
            code_block(&test.output)
        );
        IssueRequest {
            title,
            body,
            labels: ISSUE_LABELS.iter().map(ToString::to_string).collect(),
        }
    }

    fn post_run_details(&mut self, root: &TestResult) -> Result<(), ReportError> {
        let comment = IssueComment {
            body: format!("Run details:\n\n{}", code_block(&root.output)),
        };
        for &number in &self.issues {
            self.tracker
                .create_comment(
                    &self.repository.owner,
                    &self.repository.name,
                    number,
                    &comment,
                )
                .map_err(|source| ReportError::CreateComment { number, source })?;
            self.summary.comments_posted += 1;
        }
        Ok(())
    }
}

/// Wrap output lines in a markdown code fence
#[must_use]
pub fn code_block(lines: &[String]) -> String {
    let mut block = Vec::with_capacity(lines.len() + 2);
    block.push(CODE_FENCE);
    block.extend(lines.iter().map(String::as_str));
    block.push(CODE_FENCE);
    block.join("\n")
}

/// Parse test output from `reader` and post every failure
///
/// # Errors
///
/// Returns `ReportError` if the output cannot be parsed or the tracker fails.
pub fn post_failures<R, T>(reader: R, poster: &mut IssuePoster<T>) -> Result<PostSummary, ReportError>
where
    R: BufRead,
    T: IssueTracker,
{
    for_each_test(reader, |test, last| poster.handle(test, last))?;
    let summary = poster.summary();
    info!(
        issues = summary.issues_created,
        comments = summary.comments_posted,
        "Finished posting stress results"
    );
    Ok(summary)
}
