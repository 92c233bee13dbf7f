// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Folding of the flat event stream into hierarchical entries
//!
//! The [`Aggregator`] owns two identity-keyed tables:
//!
//! - the in-progress table, one [`TestEntry`] per `(package, test)` that has
//!   not been emitted yet, in first-seen order;
//! - the pending table, the subtests of each root test whose terminal event
//!   already arrived, in arrival order.
//!
//! A root test or package is emitted as soon as its terminal event arrives,
//! with its pending subtests attached. Subtests are never emitted on their
//! own. Emitted entries are evicted from both tables.
//!
//! # Example
//!
//! ```
//! use gotidy_events::{Action, Aggregator, Event};
//!
//! let mut aggregator = Aggregator::new();
//! assert!(aggregator.apply(Event::new(Action::Fail, "p", "TestA/case")).is_none());
//!
//! let root = aggregator
//!     .apply(Event::new(Action::Fail, "p", "TestA"))
//!     .expect("root is emitted");
//! assert_eq!(root.sub_tests.len(), 1);
//! ```

use indexmap::IndexMap;
use tracing::debug;

use crate::entry::{Status, TestEntry, root_test_name};
use crate::event::{Action, EntryKey, Event};

/// Prefixes of framework result and progress banners, matched on trimmed text
const BANNER_PREFIXES: &[&str] = &[
    "--- PASS:",
    "--- FAIL:",
    "--- SKIP:",
    "=== RUN",
    "=== PAUSE",
    "=== CONT",
    "=== NAME",
];

/// First words of unindented framework noise
const NOISE_WORDS: &[&str] = &["---", "===", "PASS", "FAIL"];

/// How a single output line is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputClass {
    /// Output after a panic, kept verbatim
    Verbatim,
    /// Package `?` line: the package has no test files
    NoTestFiles,
    /// Package `ok` line
    PackageOk {
        /// `(cached)` was present
        cached: bool,
    },
    /// Package `FAIL` line
    PackageFail {
        /// `[build failed]` was present
        build_failed: bool,
    },
    /// First line of a panic
    PanicStart,
    /// Framework result or progress banner, dropped
    Banner,
    /// Indented diagnostic text
    Continuation,
    /// Unindented framework noise, dropped
    Noise,
    /// Anything else: a log line
    Log,
}

/// Classify one output line for the given entry
///
/// Rules are ordered and mutually exclusive; see [`OutputClass`].
#[must_use]
pub fn classify_output(entry: &TestEntry, output: &str) -> OutputClass {
    if entry.flags.panicked {
        return OutputClass::Verbatim;
    }

    let trimmed = output.trim();

    if entry.is_package() {
        if trimmed.starts_with('?') {
            return OutputClass::NoTestFiles;
        }
        if trimmed.starts_with("ok") {
            return OutputClass::PackageOk {
                cached: trimmed.contains("(cached)"),
            };
        }
        if trimmed.starts_with("FAIL") {
            return OutputClass::PackageFail {
                build_failed: trimmed.contains("[build failed]"),
            };
        }
    }

    if trimmed.starts_with("panic:") {
        return OutputClass::PanicStart;
    }

    if BANNER_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return OutputClass::Banner;
    }

    if output.starts_with([' ', '\t']) {
        return OutputClass::Continuation;
    }

    let first_word = trimmed.split_whitespace().next().unwrap_or_default();
    if NOISE_WORDS.contains(&first_word) {
        return OutputClass::Noise;
    }

    OutputClass::Log
}

/// Stateful event folder
///
/// Single-threaded by construction: it is owned by whichever task drives it.
#[derive(Debug, Default)]
pub struct Aggregator {
    in_progress: IndexMap<EntryKey, TestEntry>,
    pending: IndexMap<EntryKey, Vec<EntryKey>>,
}

impl Aggregator {
    /// Create an empty aggregator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event, returning the entry it finalizes, if any
    ///
    /// The returned entry carries its subtests, in the order their terminal
    /// events arrived.
    pub fn apply(&mut self, event: Event) -> Option<TestEntry> {
        if event.action.is_ignored() {
            return None;
        }

        let key = event.key();
        let entry = self
            .in_progress
            .entry(key.clone())
            .or_insert_with(|| TestEntry::new(&event.package, &event.test));

        entry.elapsed += event.elapsed;

        if let Some(status) = Status::from_action(event.action) {
            entry.status = status;
        }

        match event.action {
            Action::Pass | Action::Fail | Action::Skip => {
                if entry.is_package() {
                    entry.flags.package_finished = true;
                }
                entry.flags.package_has_errors = event.action == Action::Fail;

                let root_key = EntryKey::new(&key.package, entry.root_test_name());
                if entry.is_sub_test() {
                    let siblings = self.pending.entry(root_key).or_default();
                    if !siblings.contains(&key) {
                        siblings.push(key);
                    }
                    return None;
                }

                Some(self.emit(&key, &root_key))
            }
            Action::Output => {
                apply_output(entry, &event.output);
                None
            }
            Action::Run
            | Action::Start
            | Action::Pause
            | Action::Continue
            | Action::Bench
            | Action::BuildOutput
            | Action::BuildFail
            | Action::Other => None,
        }
    }

    /// Number of entries still accumulating
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_progress.len()
    }

    /// Number of finished subtests waiting for their root
    #[must_use]
    pub fn pending_sub_tests(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Flush every entry that never received a terminal event
    ///
    /// Entries keep their `Running` status and come out in first-seen order.
    /// Subtests are attached to their root (finished ones first, in arrival
    /// order, then running ones); a root with no entry of its own is created
    /// to hold them. Entries with nothing to show are dropped.
    #[must_use]
    pub fn finish(self) -> Vec<TestEntry> {
        let Self {
            in_progress,
            mut pending,
        } = self;

        let (mut subs, mut roots): (IndexMap<_, _>, IndexMap<_, _>) = in_progress
            .into_iter()
            .partition(|(_, entry): &(EntryKey, TestEntry)| entry.is_sub_test());

        let mut children: IndexMap<EntryKey, Vec<TestEntry>> = IndexMap::new();
        for (root_key, keys) in pending.drain(..) {
            let finished = keys.iter().filter_map(|key| subs.shift_remove(key));
            children.entry(root_key).or_default().extend(finished);
        }
        for (key, sub) in subs {
            let root_key = EntryKey::new(&key.package, root_test_name(&key.test));
            children.entry(root_key).or_default().push(sub);
        }

        for (root_key, sub_tests) in children {
            roots
                .entry(root_key.clone())
                .or_insert_with(|| TestEntry::new(&root_key.package, &root_key.test))
                .sub_tests
                .extend(sub_tests);
        }

        roots
            .into_values()
            .filter(|entry| {
                if !entry.has_content() {
                    debug!(package = %entry.package, test = %entry.name, "dropping empty unfinished entry");
                    return false;
                }
                true
            })
            .collect()
    }

    fn emit(&mut self, key: &EntryKey, root_key: &EntryKey) -> TestEntry {
        let sub_tests: Vec<TestEntry> = self
            .pending
            .shift_remove(root_key)
            .unwrap_or_default()
            .iter()
            .filter_map(|sub_key| self.in_progress.shift_remove(sub_key))
            .collect();

        let mut entry = self
            .in_progress
            .shift_remove(key)
            .unwrap_or_else(|| TestEntry::new(&key.package, &key.test));
        entry.sub_tests = sub_tests;

        debug!(
            package = %entry.package,
            test = %entry.name,
            status = ?entry.status,
            sub_tests = entry.sub_tests.len(),
            "emitting entry"
        );

        entry
    }
}

fn apply_output(entry: &mut TestEntry, output: &str) {
    match classify_output(entry, output) {
        OutputClass::NoTestFiles => entry.flags.no_test_files = true,
        OutputClass::PackageOk { cached } => entry.flags.cached = cached,
        OutputClass::PackageFail { build_failed } => entry.flags.build_failed = build_failed,
        OutputClass::PanicStart => {
            entry.flags.panicked = true;
            entry.raw_output.push_str(output);
        }
        OutputClass::Verbatim | OutputClass::Continuation => entry.raw_output.push_str(output),
        OutputClass::Log => entry
            .log_lines
            .push(output.trim_end_matches(['\n', '\r']).to_string()),
        OutputClass::Banner | OutputClass::Noise => {}
    }
}
