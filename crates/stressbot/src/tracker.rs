// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Bug tracker and build server contracts
//!
//! The network clients live outside this crate. [`IssueTracker`] and
//! [`BuildQueue`] describe the calls the orchestration layer makes, and
//! [`DryRun`] implements both by writing each request as one JSON line.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

// ============================================================================
// Error Types
// ============================================================================

/// Errors returned by a tracker or build server
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The remote service rejected the request
    #[error("Request rejected: {message}")]
    Rejected {
        /// Message returned by the service
        message: String,
    },

    /// Error writing a dry-run record
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error serializing a dry-run record
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Request and response types
// ============================================================================

/// A new issue to file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Issue title
    pub title: String,
    /// Issue body (markdown)
    pub body: String,
    /// Labels to apply
    pub labels: Vec<String>,
}

/// An issue created by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number within the repository
    pub number: u64,
}

/// A comment to add to an existing issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment body (markdown)
    pub body: String,
}

/// A build accepted by the build server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedBuild {
    /// Build id assigned by the server
    pub id: u64,
    /// Build configuration the build was queued for
    pub build_type_id: String,
    /// VCS branch to build
    pub branch: String,
}

// ============================================================================
// Contracts
// ============================================================================

/// Issue operations keyed by repository owner and name
pub trait IssueTracker {
    /// File a new issue
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the issue could not be created.
    fn create_issue(
        &mut self,
        owner: &str,
        repo: &str,
        issue: &IssueRequest,
    ) -> Result<Issue, TrackerError>;

    /// Comment on an existing issue
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the comment could not be posted.
    fn create_comment(
        &mut self,
        owner: &str,
        repo: &str,
        number: u64,
        comment: &IssueComment,
    ) -> Result<(), TrackerError>;
}

/// Build queueing keyed by build configuration id
pub trait BuildQueue {
    /// Queue a build of `branch` with the given parameters
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the build could not be queued.
    fn queue_build(
        &mut self,
        build_type_id: &str,
        branch: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<QueuedBuild, TrackerError>;
}

// ============================================================================
// Dry run
// ============================================================================

/// One request recorded by [`DryRun`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum DryRunRecord {
    /// `create_issue`
    CreateIssue {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Number handed back to the caller
        number: u64,
        /// The issue
        issue: IssueRequest,
    },
    /// `create_comment`
    CreateComment {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Issue commented on
        number: u64,
        /// The comment
        comment: IssueComment,
    },
    /// `queue_build`
    QueueBuild {
        /// The queued build
        build: QueuedBuild,
        /// Build parameters
        params: BTreeMap<String, String>,
    },
}

/// Tracker and build queue that only records requests
///
/// Each request is written to the sink as a single JSON line. Issue numbers
/// and build ids are handed out sequentially from 1.
#[derive(Debug)]
pub struct DryRun<W> {
    sink: W,
    next_issue: u64,
    next_build: u64,
}

impl<W: Write> DryRun<W> {
    /// Create a dry run writing to `sink`
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            next_issue: 1,
            next_build: 1,
        }
    }

    /// Consume the dry run and return the sink
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn record(&mut self, record: &DryRunRecord) -> Result<(), TrackerError> {
        serde_json::to_writer(&mut self.sink, record)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        Ok(())
    }
}

impl<W: Write> IssueTracker for DryRun<W> {
    fn create_issue(
        &mut self,
        owner: &str,
        repo: &str,
        issue: &IssueRequest,
    ) -> Result<Issue, TrackerError> {
        let number = self.next_issue;
        self.next_issue += 1;
        info!(owner, repo, number, title = %issue.title, "Dry run: create issue");
        self.record(&DryRunRecord::CreateIssue {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            issue: issue.clone(),
        })?;
        Ok(Issue { number })
    }

    fn create_comment(
        &mut self,
        owner: &str,
        repo: &str,
        number: u64,
        comment: &IssueComment,
    ) -> Result<(), TrackerError> {
        info!(owner, repo, number, "Dry run: create comment");
        self.record(&DryRunRecord::CreateComment {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            comment: comment.clone(),
        })
    }
}

impl<W: Write> BuildQueue for DryRun<W> {
    fn queue_build(
        &mut self,
        build_type_id: &str,
        branch: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<QueuedBuild, TrackerError> {
        let build = QueuedBuild {
            id: self.next_build,
            build_type_id: build_type_id.to_string(),
            branch: branch.to_string(),
        };
        self.next_build += 1;
        info!(id = build.id, build_type_id, branch, "Dry run: queue build");
        self.record(&DryRunRecord::QueueBuild {
            build: build.clone(),
            params: params.clone(),
        })?;
        Ok(build)
    }
}
