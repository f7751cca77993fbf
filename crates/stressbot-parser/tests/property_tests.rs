// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Property-based tests for stressbot-parser
//!
//! Random trees of nested tests are rendered to `go test -v` text and parsed
//! back, checking emission order, counts and output attribution.

use proptest::prelude::*;
use stressbot_parser::{ParseError, TestResult, for_each_test, parse_output};

/// A generated test with its own output and children
#[derive(Debug, Clone)]
struct Node {
    name: String,
    // Lines printed before each child, then the trailing lines
    lines: Vec<String>,
    children: Vec<Node>,
    verdict: &'static str,
}

// ============================================================================
// Strategies
// ============================================================================

/// Lines that never match a boundary pattern
fn plain_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("    foo_test.go:12: some message".to_string()),
        Just("PASS".to_string()),
        Just("=== PAUSE TestX".to_string()),
        Just("--- PASS: missing elapsed".to_string()),
        Just("  WARNING: DATA RACE".to_string()),
        "log:[a-z0-9 :\\t]{0,40}",
    ]
}

/// Marker and plain lines in any order, well-formed or not
fn any_line() -> impl Strategy<Value = String> {
    prop_oneof![
        plain_line(),
        Just("=== RUN   TestA".to_string()),
        Just("=== RUN   TestB".to_string()),
        Just("--- PASS: TestA (0.00s)".to_string()),
        Just("--- FAIL: TestB (0.01s)".to_string()),
        Just("WARNING: DATA RACE".to_string()),
        Just("ok  \tpkg/a\t0.010s".to_string()),
    ]
}

fn verdict() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("PASS"), Just("FAIL"), Just("SKIP")]
}

fn tree() -> impl Strategy<Value = Node> {
    let leaf = (
        "Test[A-Z][a-z]{0,6}",
        prop::collection::vec(plain_line(), 0..4),
        verdict(),
    )
        .prop_map(|(name, lines, verdict)| Node {
            name,
            lines,
            children: Vec::new(),
            verdict,
        });

    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            "Test[A-Z][a-z]{0,6}",
            prop::collection::vec(plain_line(), 0..4),
            prop::collection::vec(inner, 0..4),
            verdict(),
        )
            .prop_map(|(name, lines, children, verdict)| Node {
                name,
                lines,
                children,
                verdict,
            })
    })
}

// ============================================================================
// Rendering and expectations
// ============================================================================

fn qualify(parent: &str, node: &Node) -> String {
    if parent.is_empty() {
        node.name.clone()
    } else {
        format!("{parent}/{}", node.name)
    }
}

fn render(parent: &str, node: &Node, out: &mut String) {
    let name = qualify(parent, node);
    out.push_str(&format!("=== RUN   {name}\n"));
    for (i, line) in node.lines.iter().enumerate() {
        out.push_str(line);
        out.push('\n');
        if let Some(child) = node.children.get(i) {
            render(&name, child, out);
        }
    }
    for child in node.children.iter().skip(node.lines.len()) {
        render(&name, child, out);
    }
    out.push_str(&format!("--- {}: {name} (0.00s)\n", node.verdict));
}

/// Expected emissions in post-order
fn expect(parent: &str, node: &Node, out: &mut Vec<TestResult>) {
    let name = qualify(parent, node);
    for child in &node.children {
        expect(&name, child, out);
    }
    let mut result = TestResult::named(name);
    result.output = node.lines.clone();
    match node.verdict {
        "PASS" => result.pass = true,
        "FAIL" => result.fail = true,
        _ => result.skip = true,
    }
    out.push(result);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_tree_roundtrip(roots in prop::collection::vec(tree(), 0..4)) {
        let mut text = String::new();
        let mut expected = Vec::new();
        for root in &roots {
            render("", root, &mut text);
            expect("", root, &mut expected);
        }

        let run = parse_output(&text).expect("well-formed input should parse");
        prop_assert_eq!(&run.tests, &expected);
        prop_assert!(run.root.is_root());
        prop_assert!(run.root.output.is_empty());
    }

    #[test]
    fn prop_exactly_one_terminal_emission_last(roots in prop::collection::vec(tree(), 0..3)) {
        let mut text = String::new();
        for root in &roots {
            render("", root, &mut text);
        }

        let mut lasts = Vec::new();
        for_each_test(text.as_bytes(), |test, last| {
            lasts.push((test.is_root(), last));
            Ok::<_, ParseError>(())
        })
        .expect("well-formed input should parse");

        prop_assert_eq!(lasts.iter().filter(|(_, last)| *last).count(), 1);
        prop_assert_eq!(lasts.last().copied(), Some((true, true)));
    }

    #[test]
    fn prop_plain_lines_stay_in_root(lines in prop::collection::vec(plain_line(), 0..50)) {
        let text = lines.join("\n");
        let run = parse_output(&text).expect("plain output should parse");
        prop_assert!(run.tests.is_empty());

        // `str::lines` semantics: a trailing empty segment is not a line
        let expected: Vec<String> = text.lines().map(str::to_string).collect();
        prop_assert_eq!(run.root.output, expected);
    }

    #[test]
    fn prop_arbitrary_input_is_deterministic(lines in prop::collection::vec(any_line(), 0..60)) {
        let input = lines.join("\n");
        let first = parse_output(&input);
        let second = parse_output(&input);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "parses disagreed"),
        }
    }
}
