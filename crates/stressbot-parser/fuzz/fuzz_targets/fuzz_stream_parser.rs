// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the streaming parser
//!
//! Feeds arbitrary bytes through `for_each_test` and checks that a successful
//! parse always ends with exactly one terminal emission for the root.

#![no_main]

use libfuzzer_sys::fuzz_target;

use stressbot_parser::{ParseError, for_each_test};

fuzz_target!(|data: &[u8]| {
    let mut finals = 0usize;
    let mut root_last = false;

    let result = for_each_test(data, |test, last| {
        if last {
            finals += 1;
        }
        root_last = last && test.is_root();
        Ok::<_, ParseError>(())
    });

    if result.is_ok() {
        assert_eq!(finals, 1);
        assert!(root_last);
    }
});
