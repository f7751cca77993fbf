// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Queueing stress builds
//!
//! A [`StressPlan`] expands a list of Go packages into one build per package
//! and per `GOFLAGS` variant, and queues them on a [`BuildQueue`].

use std::collections::BTreeMap;
use std::io::BufRead;

use thiserror::Error;
use tracing::info;

use crate::tracker::{BuildQueue, QueuedBuild, TrackerError};

/// Build parameter carrying the package import path
pub const PKG_PARAM: &str = "env.PKG";
/// Build parameter carrying the go flags
pub const GOFLAGS_PARAM: &str = "env.GOFLAGS";
/// Flag variants stressed by default
pub const DEFAULT_GOFLAGS: [&str; 2] = ["-race", "-tags deadlock"];

/// Errors while queueing stress builds
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The build server refused a build
    #[error(
        "failed to queue build (build_type_id={build_type_id} branch={branch}, params={params:?}): {source}"
    )]
    QueueBuild {
        /// Build configuration id
        build_type_id: String,
        /// VCS branch
        branch: String,
        /// Parameters of the refused build
        params: BTreeMap<String, String>,
        /// Build server error
        #[source]
        source: TrackerError,
    },

    /// Error reading the package list
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The set of builds to queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressPlan {
    /// Build configuration id
    pub build_type_id: String,
    /// VCS branch to build (empty for the default branch)
    pub branch: String,
    /// `GOFLAGS` variants, outermost loop
    pub goflags: Vec<String>,
    /// Package import paths
    pub packages: Vec<String>,
}

impl StressPlan {
    /// Create a plan with the default flag variants
    #[must_use]
    pub fn new(build_type_id: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            build_type_id: build_type_id.into(),
            branch: branch.into(),
            goflags: DEFAULT_GOFLAGS.iter().map(ToString::to_string).collect(),
            packages: Vec::new(),
        }
    }

    /// Set the packages to stress
    #[must_use]
    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages = packages.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the flag variants
    #[must_use]
    pub fn with_goflags<I, S>(mut self, goflags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.goflags = goflags.into_iter().map(Into::into).collect();
        self
    }

    /// Parameters for every build, flags outermost
    #[must_use]
    pub fn builds(&self) -> Vec<BTreeMap<String, String>> {
        self.goflags
            .iter()
            .flat_map(|flags| {
                self.packages.iter().map(move |pkg| {
                    BTreeMap::from([
                        (PKG_PARAM.to_string(), pkg.clone()),
                        (GOFLAGS_PARAM.to_string(), flags.clone()),
                    ])
                })
            })
            .collect()
    }

    /// Queue every build, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns `TriggerError::QueueBuild` for the first build the server
    /// refuses. Builds queued before it stay queued.
    pub fn queue_all<Q: BuildQueue>(&self, queue: &mut Q) -> Result<Vec<QueuedBuild>, TriggerError> {
        let mut queued = Vec::new();
        for params in self.builds() {
            let build = queue
                .queue_build(&self.build_type_id, &self.branch, &params)
                .map_err(|source| TriggerError::QueueBuild {
                    build_type_id: self.build_type_id.clone(),
                    branch: self.branch.clone(),
                    params: params.clone(),
                    source,
                })?;
            info!(
                build_type_id = %self.build_type_id,
                branch = %self.branch,
                params = ?params,
                id = build.id,
                "Queued stress build"
            );
            queued.push(build);
        }
        Ok(queued)
    }
}

/// Read package import paths, one per line
///
/// Blank lines and lines starting with `#` are skipped.
///
/// # Errors
///
/// Returns `TriggerError::Io` if the reader fails.
pub fn read_packages<R: BufRead>(reader: R) -> Result<Vec<String>, TriggerError> {
    let mut packages = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        packages.push(line.to_string());
    }
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    struct Refusing {
        accept: usize,
        seen: Vec<BTreeMap<String, String>>,
    }

    impl BuildQueue for Refusing {
        fn queue_build(
            &mut self,
            build_type_id: &str,
            branch: &str,
            params: &BTreeMap<String, String>,
        ) -> Result<QueuedBuild, TrackerError> {
            if self.seen.len() == self.accept {
                return Err(TrackerError::Rejected {
                    message: "queue full".to_string(),
                });
            }
            self.seen.push(params.clone());
            Ok(QueuedBuild {
                id: self.seen.len() as u64,
                build_type_id: build_type_id.to_string(),
                branch: branch.to_string(),
            })
        }
    }

    #[test]
    fn test_builds_are_flags_by_packages() {
        let plan = StressPlan::new("Nightlies_Stress", "master").with_packages(["./kv", "./sql"]);
        let builds: Vec<(String, String)> = plan
            .builds()
            .into_iter()
            .map(|p| (p[GOFLAGS_PARAM].clone(), p[PKG_PARAM].clone()))
            .collect();
        assert_eq!(
            builds,
            vec![
                ("-race".to_string(), "./kv".to_string()),
                ("-race".to_string(), "./sql".to_string()),
                ("-tags deadlock".to_string(), "./kv".to_string()),
                ("-tags deadlock".to_string(), "./sql".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_plan_queues_nothing() {
        let plan = StressPlan::new("Nightlies_Stress", "");
        let mut queue = Refusing {
            accept: 0,
            seen: Vec::new(),
        };
        assert!(plan.queue_all(&mut queue).expect("nothing to queue").is_empty());
    }

    #[test]
    fn test_queue_stops_at_first_failure() {
        let plan = StressPlan::new("Nightlies_Stress", "release-1.0")
            .with_goflags(["-race"])
            .with_packages(["./a", "./b", "./c"]);
        let mut queue = Refusing {
            accept: 1,
            seen: Vec::new(),
        };

        let err = plan.queue_all(&mut queue).expect_err("second build refused");
        match err {
            TriggerError::QueueBuild { branch, params, .. } => {
                assert_eq!(branch, "release-1.0");
                assert_eq!(params[PKG_PARAM], "./b");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(queue.seen.len(), 1);
    }

    #[test]
    fn test_read_packages_skips_comments() {
        let input = "# storage packages\n./storage\n\n  ./storage/engine  \n";
        let packages = read_packages(input.as_bytes()).expect("read");
        assert_eq!(
            packages,
            vec!["./storage".to_string(), "./storage/engine".to_string()]
        );
    }
}
