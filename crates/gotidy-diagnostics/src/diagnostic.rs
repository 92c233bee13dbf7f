// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Reformatting of the diagnostic text captured for failed tests
//!
//! [`Diagnostic::parse`] classifies each captured line, top to bottom:
//!
//! 1. blank lines are dropped;
//! 2. an assertion report is handed to [`AssertionBlock::parse`];
//! 3. once a `panic:` line was seen, lines are panic output;
//! 4. `file.go:line: message` lines are split into location and message;
//! 5. anything else passes through unchanged.
//!
//! [`FailureBlock`] walks a failed [`TestEntry`] and its failed subtests.

use std::sync::LazyLock;

use gotidy_events::{Status, TestEntry};
use regex::Regex;

use crate::assertion::{AssertionBlock, is_assertion_start};
use crate::scanner::RewindScanner;
use crate::style::{Role, Styles};

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w\s.-]+\.go:\d+:)(.*)").expect("location pattern is valid")
});

static PANIC_SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z]:\\|/)?([\w\s.-]+[/\\])*[\w\s.-]+\.go:\d+")
        .expect("panic source pattern is valid")
});

const PANIC_MARKER: &str = "panic:";

/// One classified line (or block) of diagnostic text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticLine {
    /// `file.go:line:` followed by a message
    Location {
        /// The `file.go:line:` prefix
        location: String,
        /// Everything after the prefix
        message: String,
    },
    /// A line of panic output
    Panic {
        /// The trimmed line
        text: String,
        /// Whether the line is a source location in the stack trace
        is_source: bool,
    },
    /// A structured assertion report
    Assertion(AssertionBlock),
    /// Unrecognised text, passed through as-is
    Text(String),
}

impl DiagnosticLine {
    /// Render as report text; assertion blocks span several lines
    #[must_use]
    pub fn render(&self, styles: &Styles) -> String {
        match self {
            Self::Location { location, message } => format!(
                "\t{}{}",
                styles.style(location, Role::Location),
                styles.style(message, Role::Error)
            ),
            Self::Panic { text, is_source } => {
                let styled = styles.style(text, Role::Error);
                if *is_source {
                    format!("\t{styled}")
                } else {
                    styled
                }
            }
            Self::Assertion(block) => block.render(styles),
            Self::Text(text) => text.clone(),
        }
    }
}

/// Diagnostic text of one entry, classified line by line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    /// Classified lines in their original order
    pub lines: Vec<DiagnosticLine>,
}

impl Diagnostic {
    /// Classify captured output
    ///
    /// Never fails: text that matches no known layout is kept as
    /// [`DiagnosticLine::Text`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut lines = Vec::new();
        let mut scanner = RewindScanner::lines(raw);
        let mut panic_started = false;

        while let Some(line) = scanner.next() {
            let trimmed = line.trim();

            if trimmed.starts_with(PANIC_MARKER) {
                panic_started = true;
            }

            if trimmed.is_empty() {
                continue;
            }

            if is_assertion_start(line) {
                lines.push(DiagnosticLine::Assertion(AssertionBlock::parse(
                    line,
                    &mut scanner,
                )));
                continue;
            }

            if panic_started {
                lines.push(DiagnosticLine::Panic {
                    text: trimmed.to_string(),
                    is_source: PANIC_SOURCE_RE.is_match(trimmed),
                });
                continue;
            }

            if let Some(caps) = LOCATION_RE.captures(trimmed) {
                lines.push(DiagnosticLine::Location {
                    location: caps[1].to_string(),
                    message: caps[2].to_string(),
                });
                continue;
            }

            lines.push(DiagnosticLine::Text(line.to_string()));
        }

        Self { lines }
    }

    /// Whether no line survived classification
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render every line
    #[must_use]
    pub fn render(&self, styles: &Styles) -> Vec<String> {
        self.lines.iter().map(|line| line.render(styles)).collect()
    }
}

/// Formatted failure of a test and, recursively, of its failed subtests
#[derive(Debug, Clone, PartialEq)]
pub struct FailureBlock {
    /// Test name
    pub name: String,
    /// Elapsed seconds
    pub elapsed: f64,
    /// Classified diagnostic text
    pub diagnostic: Diagnostic,
    /// Log lines printed by the test
    pub logs: Vec<String>,
    /// Failed subtests, in the order they were attached
    pub sub_failures: Vec<FailureBlock>,
}

impl FailureBlock {
    /// Build the block for a failed entry
    ///
    /// Only subtests whose status is `Fail` are included.
    #[must_use]
    pub fn from_entry(entry: &TestEntry) -> Self {
        Self {
            name: entry.name.clone(),
            elapsed: entry.elapsed,
            diagnostic: Diagnostic::parse(&entry.raw_output),
            logs: entry.log_lines.clone(),
            sub_failures: entry
                .sub_tests_with_status(Status::Fail)
                .map(Self::from_entry)
                .collect(),
        }
    }

    /// Number of failures in this block, subtests included
    #[must_use]
    pub fn failure_count(&self) -> usize {
        1 + self
            .sub_failures
            .iter()
            .map(FailureBlock::failure_count)
            .sum::<usize>()
    }

    /// Render the block
    ///
    /// Produces a `--- FAIL <name> (<elapsed>s)` header, the body, and each
    /// failed subtest's block. A blank line separates the body from the
    /// subtests when both are present. The result ends with a newline.
    #[must_use]
    pub fn render(&self, styles: &Styles) -> String {
        let mut out = format!(
            "{} {} ({:.2}s)\n",
            styles.style("--- FAIL", Role::Error),
            self.name,
            self.elapsed
        );

        let mut body = self.diagnostic.render(styles);
        body.extend(self.logs.iter().cloned());

        if !body.is_empty() {
            out.push_str(&body.join("\n"));
            out.push('\n');

            if !self.sub_failures.is_empty() {
                out.push('\n');
            }
        }

        let subs: Vec<String> = self
            .sub_failures
            .iter()
            .map(|sub| sub.render(styles))
            .collect();
        out.push_str(&subs.join("\n"));

        out
    }
}
