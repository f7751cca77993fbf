// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! stressbot-parser: streaming parser for `go test -v` output
//!
//! This library crate turns the textual output of the Go test runner into a
//! stream of structured [`TestResult`] records, delivered to a callback as each
//! test completes, followed by exactly one terminal emission for the root
//! context once the input is exhausted.

#![warn(missing_docs)]

//! # Example
//!
//! ```
//! use stressbot_parser::{ParseError, for_each_test};
//!
//! let output = "=== RUN   TestFoo\n--- PASS: TestFoo (0.00s)\nPASS\n";
//! let mut names = Vec::new();
//! for_each_test(output.as_bytes(), |test, last| {
//!     if !last {
//!         names.push(test.name);
//!     }
//!     Ok::<_, ParseError>(())
//! })
//! .unwrap();
//! assert_eq!(names, ["TestFoo"]);
//! ```

pub mod error;
pub mod grammar;
pub mod parser;
pub mod result;

pub use error::ParseError;
pub use grammar::{Line, classify};
pub use parser::{
    ParseOptions, ParsedRun, Remainder, StreamParser, for_each_test, for_each_test_with,
    parse_output,
};
pub use result::{TestOutcome, TestResult};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ParseError;
    pub use crate::parser::{StreamParser, for_each_test, parse_output};
    pub use crate::result::{TestOutcome, TestResult};
}
