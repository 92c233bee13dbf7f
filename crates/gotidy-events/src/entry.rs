// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Aggregated test entries

use serde::{Deserialize, Serialize};

use crate::event::Action;

/// Separator between a root test and its subtests
pub const SUBTEST_SEPARATOR: char = '/';

/// Status of an entry, set by its last non-output action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No terminal event has been seen yet
    #[default]
    Running,
    /// The test or package passed
    Pass,
    /// The test or package failed
    Fail,
    /// The test was skipped, or the package had no tests
    Skip,
}

impl Status {
    /// Map a terminal action to its status
    #[must_use]
    pub fn from_action(action: Action) -> Option<Self> {
        match action {
            Action::Pass => Some(Self::Pass),
            Action::Fail => Some(Self::Fail),
            Action::Skip => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Flags collected from an entry's output and terminal events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryFlags {
    /// The package reported `[no test files]`
    pub no_test_files: bool,
    /// The package terminal event arrived
    pub package_finished: bool,
    /// The terminal event was a failure
    pub package_has_errors: bool,
    /// The package result came from the build cache
    pub cached: bool,
    /// The package failed to build
    pub build_failed: bool,
    /// The test panicked; later output is kept verbatim
    pub panicked: bool,
}

/// A test or package result folded from every event sharing its identity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestEntry {
    /// Test name; empty for a package entry
    pub name: String,
    /// Package import path
    pub package: String,
    /// Sum of the elapsed seconds of every event for this identity
    pub elapsed: f64,
    /// Current status
    pub status: Status,
    /// Captured diagnostic text (indented and post-panic output)
    pub raw_output: String,
    /// Unindented output lines that are not framework banners
    pub log_lines: Vec<String>,
    /// Subtests in the order their terminal events arrived
    pub sub_tests: Vec<TestEntry>,
    /// Output and terminal flags
    pub flags: EntryFlags,
}

impl TestEntry {
    /// Create an empty, running entry
    #[must_use]
    pub fn new(package: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            package: package.to_string(),
            ..Default::default()
        }
    }

    /// Name of the root test: everything before the first `/`
    #[must_use]
    pub fn root_test_name(&self) -> &str {
        root_test_name(&self.name)
    }

    /// Whether this entry is a subtest (`Root/Child`)
    #[must_use]
    pub fn is_sub_test(&self) -> bool {
        self.name.contains(SUBTEST_SEPARATOR)
    }

    /// Whether this entry describes a whole package
    #[must_use]
    pub fn is_package(&self) -> bool {
        self.name.is_empty()
    }

    /// Subtests that ended with the given status
    pub fn sub_tests_with_status(&self, status: Status) -> impl Iterator<Item = &TestEntry> {
        self.sub_tests.iter().filter(move |t| t.status == status)
    }

    /// Whether there is anything worth showing for this entry
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.raw_output.trim().is_empty() || !self.log_lines.is_empty() || !self.sub_tests.is_empty()
    }
}

/// Root test of a test name: the substring before the first `/`
#[must_use]
pub fn root_test_name(name: &str) -> &str {
    name.split_once(SUBTEST_SEPARATOR)
        .map_or(name, |(root, _)| root)
}
