// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for stressbot-parser

use thiserror::Error;

/// Errors that can occur while parsing test runner output
#[derive(Debug, Error)]
pub enum ParseError {
    /// An end marker named a test other than the one currently open
    #[error("expected to find end of {expected}, found end of {found}")]
    MismatchedBoundary {
        /// Name of the innermost open test (empty for the root)
        expected: String,
        /// Name carried by the end marker
        found: String,
    },

    /// Error reading the input stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
