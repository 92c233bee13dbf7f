// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for gotidy-events
//!
//! These tests drive recorded `go test -json` streams through the decoder and
//! the aggregator.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use gotidy_events::{Action, Aggregator, EventReader, EventsError, Status, TestEntry};
use similar_asserts::assert_eq;

/// Get the fixtures directory for test data
fn fixtures_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

struct Folded {
    emitted: Vec<TestEntry>,
    errors: Vec<EventsError>,
    unfinished: Vec<TestEntry>,
}

fn fold_fixture(name: &str) -> Folded {
    let file = File::open(fixtures_dir().join(name)).expect("Failed to open fixture");
    let mut aggregator = Aggregator::new();
    let mut emitted = Vec::new();
    let mut errors = Vec::new();

    for item in EventReader::new(BufReader::new(file)) {
        match item {
            Ok(event) => emitted.extend(aggregator.apply(event)),
            Err(err) => errors.push(err),
        }
    }

    Folded {
        emitted,
        errors,
        unfinished: aggregator.finish(),
    }
}

fn names(entries: &[TestEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            if entry.is_package() {
                entry.package.clone()
            } else {
                entry.name.clone()
            }
        })
        .collect()
}

#[test]
fn test_success_stream() {
    let folded = fold_fixture("success.jsonl");

    assert!(folded.errors.is_empty());
    assert!(folded.unfinished.is_empty());
    assert_eq!(
        names(&folded.emitted),
        vec![
            "example.com/shop/cmd/shop",
            "TestHealth",
            "TestRoutes",
            "example.com/shop/api",
            "TestMigrate",
            "example.com/shop/db",
        ]
    );

    let cmd = &folded.emitted[0];
    assert!(cmd.flags.no_test_files);
    assert!(cmd.flags.package_finished);
    assert_eq!(cmd.status, Status::Skip);

    let routes = &folded.emitted[2];
    assert_eq!(routes.status, Status::Pass);
    assert_eq!(names(&routes.sub_tests), vec!["TestRoutes/list", "TestRoutes/create"]);
    assert!((routes.elapsed - 0.4).abs() < f64::EPSILON);
    assert!(routes.raw_output.is_empty(), "banners are dropped");

    let api = &folded.emitted[3];
    assert!(!api.flags.cached);
    assert!((api.elapsed - 0.58).abs() < f64::EPSILON);
    assert!(api.log_lines.is_empty(), "PASS/ok lines are not logs");

    let db = &folded.emitted[5];
    assert!(db.flags.cached);
    assert_eq!(db.status, Status::Pass);
}

#[test]
fn test_failures_with_subtests() {
    let folded = fold_fixture("fail_with_subtests.jsonl");

    assert!(folded.errors.is_empty());
    assert_eq!(
        names(&folded.emitted),
        vec![
            "example.com/shop/cmd/shop",
            "TestMigrate",
            "example.com/shop/db",
            "TestTotal",
            "TestParse",
            "example.com/shop/cart",
        ]
    );

    let total = &folded.emitted[3];
    assert_eq!(total.status, Status::Fail);
    assert_eq!(
        names(&total.sub_tests),
        vec!["TestTotal/empty", "TestTotal/discount", "TestTotal/legacy"]
    );

    let statuses: Vec<Status> = total.sub_tests.iter().map(|sub| sub.status).collect();
    assert_eq!(statuses, vec![Status::Pass, Status::Fail, Status::Skip]);

    let discount = &total.sub_tests[1];
    assert_eq!(discount.raw_output, "    cart_test.go:42: got 90, want 80\n");
    assert_eq!(discount.log_lines, vec!["applying discount 10%".to_string()]);

    let legacy = &total.sub_tests[2];
    assert_eq!(legacy.raw_output, "    cart_test.go:57: legacy pricing removed\n");

    let cart = &folded.emitted[5];
    assert!(cart.flags.package_has_errors);
    assert!(!cart.flags.build_failed);
    assert!(cart.log_lines.is_empty());
}

#[test]
fn test_panic_output_kept_verbatim() {
    let folded = fold_fixture("panic.jsonl");

    let index = &folded.emitted[0];
    assert_eq!(index.name, "TestIndex");
    assert!(index.flags.panicked);
    assert!(index.raw_output.starts_with("panic: runtime error"));
    assert!(index.raw_output.contains("\n\ngoroutine 7 [running]:\n"));
    assert!(index.raw_output.ends_with("\t/src/shop/cart/index_test.go:17 +0x28\n"));
    assert!(index.log_lines.is_empty());
}

#[test]
fn test_build_failure_lines_are_decode_errors() {
    let folded = fold_fixture("build_failed.jsonl");

    let raw: Vec<&str> = folded
        .errors
        .iter()
        .filter_map(EventsError::raw_line)
        .collect();
    assert_eq!(
        raw,
        vec![
            "# example.com/shop/cart_test [example.com/shop/cart.test]",
            "cart/cart_test.go:203:2: undefined: pan",
        ]
    );

    let cart = folded.emitted.last().expect("Should emit the failed package");
    assert!(cart.flags.build_failed);
    assert_eq!(cart.status, Status::Fail);
}

#[test]
fn test_build_output_events_decode() {
    let file =
        File::open(fixtures_dir().join("build_output.jsonl")).expect("Failed to open fixture");
    let events: Vec<_> = EventReader::new(BufReader::new(file))
        .collect::<Result<_, _>>()
        .expect("Every line is a valid event");

    let build_output: Vec<&str> = events
        .iter()
        .filter(|event| event.action == Action::BuildOutput)
        .map(|event| event.output.as_str())
        .collect();
    assert_eq!(build_output.len(), 36);
    assert_eq!(
        build_output[0],
        "# example.com/shop/cart [example.com/shop/cart.test]\n"
    );

    let folded = fold_fixture("build_output.jsonl");
    assert!(folded.errors.is_empty());
    assert!(folded.unfinished.is_empty());
    assert_eq!(
        names(&folded.emitted),
        vec!["TestMigrate", "example.com/shop/db", "example.com/shop/cart"]
    );

    let cart = &folded.emitted[2];
    assert!(cart.flags.build_failed);
    assert_eq!(cart.status, Status::Fail);
}

#[test]
fn test_unfinished_stream_is_flushed() {
    let folded = fold_fixture("unfinished.jsonl");

    assert!(folded.emitted.is_empty());
    assert_eq!(names(&folded.unfinished), vec!["TestQueue"]);

    let queue = &folded.unfinished[0];
    assert_eq!(queue.status, Status::Running);
    assert_eq!(queue.raw_output, "    queue_test.go:12: still waiting\n");

    let subs: Vec<(String, Status)> = queue
        .sub_tests
        .iter()
        .map(|sub| (sub.name.clone(), sub.status))
        .collect();
    assert_eq!(
        subs,
        vec![
            ("TestQueue/fast".to_string(), Status::Pass),
            ("TestQueue/hang".to_string(), Status::Running),
        ]
    );
}

mod properties {
    use gotidy_events::{Action, Aggregator, Event, TestEntry};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_elapsed_is_sum_of_parts(parts in prop::collection::vec(0u32..10_000, 1..20)) {
            let mut aggregator = Aggregator::new();
            let mut expected = 0.0;

            for (i, millis) in parts.iter().enumerate() {
                let elapsed = f64::from(*millis) / 1000.0;
                expected += elapsed;
                let action = if i + 1 == parts.len() { Action::Pass } else { Action::Output };
                let emitted = aggregator.apply(Event::new(action, "p", "TestSum").with_elapsed(elapsed));
                if let Some(entry) = emitted {
                    prop_assert!((entry.elapsed - expected).abs() < 1e-9);
                }
            }
        }

        #[test]
        fn prop_subtests_attach_in_terminal_order(order in Just((0..8).collect::<Vec<usize>>()).prop_shuffle()) {
            let mut aggregator = Aggregator::new();

            for i in 0..8 {
                let _ = aggregator.apply(Event::new(Action::Run, "p", &format!("TestRoot/case{i}")));
            }
            for i in &order {
                let emitted = aggregator.apply(Event::new(Action::Pass, "p", &format!("TestRoot/case{i}")));
                prop_assert!(emitted.is_none());
            }

            let root = aggregator
                .apply(Event::new(Action::Pass, "p", "TestRoot"))
                .expect("root is emitted");
            let attached: Vec<String> = root.sub_tests.iter().map(|sub| sub.name.clone()).collect();
            let expected: Vec<String> = order.iter().map(|i| format!("TestRoot/case{i}")).collect();

            prop_assert_eq!(attached, expected);
            prop_assert_eq!(aggregator.in_flight(), 0);
        }

        #[test]
        fn prop_emission_follows_terminal_events(order in Just((0..6).collect::<Vec<usize>>()).prop_shuffle()) {
            let mut aggregator = Aggregator::new();

            for i in 0..6 {
                let _ = aggregator.apply(
                    Event::new(Action::Output, "p", &format!("Test{i}")).with_output("    detail\n"),
                );
            }

            let emitted: Vec<TestEntry> = order
                .iter()
                .filter_map(|i| aggregator.apply(Event::new(Action::Fail, "p", &format!("Test{i}"))))
                .collect();
            let emitted: Vec<String> = emitted.into_iter().map(|entry| entry.name).collect();
            let expected: Vec<String> = order.iter().map(|i| format!("Test{i}")).collect();

            prop_assert_eq!(emitted, expected);
        }
    }
}
