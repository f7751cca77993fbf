// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the stressbot CLI
//!
//! Settings come from command line flags, with the environment variables set
//! by the CI server as fallbacks.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default build configuration for stress builds
pub const DEFAULT_BUILD_TYPE_ID: &str = "Cockroach_Nightlies_Stress";

/// Stressbot - file issues for stress failures and queue stress builds
#[derive(Parser, Debug, Clone)]
#[command(name = "stressbot")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with records on stdout.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Parse `go test -v` output and print each result as a JSON line
    ///
    /// Example:
    ///   go test -v ./storage 2>&1 | stressbot parse
    Parse {
        /// Read test output from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// Also emit tests cut off by the end of the output
        #[arg(long, default_value = "false")]
        flush_unterminated: bool,
    },

    /// File an issue for every failed test in the output read from stdin
    ///
    /// Example:
    ///   stress ./storage/stress.test -test.v 2>&1 | stressbot post --package ./storage
    Post {
        /// Import path of the package under test
        #[arg(long, env = "PKG")]
        package: String,

        /// Commit SHA that was tested
        #[arg(long, env = "BUILD_VCS_NUMBER")]
        sha: String,

        /// Owner of the repository receiving issues
        #[arg(long, env = "STRESSBOT_OWNER", default_value = "cockroachdb")]
        owner: String,

        /// Repository receiving issues
        #[arg(long, env = "STRESSBOT_REPO", default_value = "cockroach")]
        repo: String,

        /// Read test output from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Queue a stress build for every package and flag variant
    ///
    /// Packages are taken from the arguments, or one per line from stdin.
    Trigger {
        /// Build configuration id to queue
        #[arg(long, default_value = DEFAULT_BUILD_TYPE_ID)]
        build: String,

        /// VCS branch to build
        #[arg(long, default_value = "")]
        branch: String,

        /// `GOFLAGS` variants; defaults to `-race` and `-tags deadlock`
        #[arg(long = "goflags", allow_hyphen_values = true)]
        goflags: Vec<String>,

        /// Package import paths
        packages: Vec<String>,
    },
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `post` is missing a package or SHA
    /// - `trigger` has an empty build configuration id
    /// - an input file does not exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.command {
            Command::Parse { input, .. } => check_input(input.as_ref()),
            Command::Post {
                package,
                sha,
                input,
                ..
            } => {
                if package.trim().is_empty() {
                    return Err(ConfigError::MissingValue("package (PKG)"));
                }
                if sha.trim().is_empty() {
                    return Err(ConfigError::MissingValue("sha (BUILD_VCS_NUMBER)"));
                }
                check_input(input.as_ref())
            }
            Command::Trigger { build, .. } => {
                if build.trim().is_empty() {
                    return Err(ConfigError::MissingValue("build"));
                }
                Ok(())
            }
        }
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

fn check_input(input: Option<&PathBuf>) -> Result<(), ConfigError> {
    match input {
        Some(path) if !path.is_file() => Err(ConfigError::InputNotFound(path.clone())),
        _ => Ok(()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required value is empty
    #[error("Missing required value: {0}")]
    MissingValue(&'static str),

    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),
}
