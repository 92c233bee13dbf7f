// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report rendering
//!
//! The [`Renderer`] consumes finalized entries in arrival order. Package
//! status lines are written immediately; skip blocks, failure blocks and the
//! other trailing sections are buffered and written by
//! [`Renderer::finish`], followed by the summary.

use std::io::Write;

use gotidy_diagnostics::{Diagnostic, FailureBlock, Role, Styles};
use gotidy_events::{Status, TestEntry};
use thiserror::Error;
use tracing::{debug, warn};

/// Decode failures tolerated before the stream is declared unparsable
pub const MAX_DECODE_ERRORS: usize = 30;

/// Printed when the input does not look like a `go test -json` stream
pub const UNPARSABLE_MESSAGE: &str =
    "no valid events found, if you are piping into gotidy, go test must be run with -json flag";

/// Errors that end rendering early
#[derive(Debug, Error)]
pub enum ReportError {
    /// Too many lines failed to decode
    #[error("Input is not a go test -json stream ({errors} malformed lines)")]
    Unparsable {
        /// Decode failures recorded before giving up
        errors: usize,
    },

    /// Writing the report failed
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Counts and timing reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Passed tests, subtests included
    pub passed: usize,
    /// Failed tests, subtests included
    pub failed: usize,
    /// Skipped tests, subtests included
    pub skipped: usize,
    /// Sum of the elapsed seconds of non-cached packages
    pub elapsed: f64,
    /// Lines that could not be decoded
    pub decode_errors: usize,
    /// Packages that failed, including build failures
    pub failed_packages: usize,
    /// Entries flushed without a terminal event (not counted as tests)
    pub incomplete: usize,
}

impl Summary {
    /// Number of tests that reached a terminal status
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// No failed tests or packages and no decode errors
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.failed_packages == 0 && self.decode_errors == 0
    }

    /// `Finished in <elapsed>s` followed by the counts line
    #[must_use]
    pub fn render(&self, styles: &Styles) -> String {
        let total = self.total();
        let noun = if total == 1 { "test" } else { "tests" };
        let counts = format!("{total} {noun}");

        let (mut line, separator) = if self.failed > 0 {
            (
                styles.style(&format!("{counts}, {} failed", self.failed), Role::Error),
                Role::Error,
            )
        } else {
            (styles.style(&counts, Role::Success), Role::Success)
        };

        if self.skipped > 0 {
            line.push_str(&styles.style(", ", separator));
            line.push_str(&styles.style(&format!("{} skipped", self.skipped), Role::Warning));
        }

        format!("Finished in {:.2}s\n{line}", self.elapsed)
    }
}

/// Streaming report writer
#[derive(Debug)]
pub struct Renderer<W: Write> {
    out: W,
    styles: Styles,
    summary: Summary,
    skips: Vec<String>,
    failures: Vec<String>,
    package_logs: Vec<String>,
    incomplete: Vec<String>,
    errors: Vec<String>,
}

impl<W: Write> Renderer<W> {
    /// Create a renderer writing to `out`
    pub fn new(out: W, styles: Styles) -> Self {
        Self {
            out,
            styles,
            summary: Summary::default(),
            skips: Vec::new(),
            failures: Vec::new(),
            package_logs: Vec::new(),
            incomplete: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Counts gathered so far
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Handle one finalized entry
    ///
    /// # Errors
    ///
    /// Returns an error if a package line cannot be written.
    pub fn entry(&mut self, entry: TestEntry) -> Result<(), ReportError> {
        if entry.is_package() {
            return self.package(&entry);
        }

        self.count(entry.status);
        for sub in &entry.sub_tests {
            self.count(sub.status);
        }

        if entry.status == Status::Skip {
            self.skips.push(skip_block(&entry, &self.styles));
        }
        for sub in entry.sub_tests_with_status(Status::Skip) {
            self.skips.push(skip_block(sub, &self.styles));
        }

        if entry.status == Status::Fail {
            self.failures
                .push(FailureBlock::from_entry(&entry).render(&self.styles));
        } else {
            // A root can finish without failing while a subtest did
            for sub in entry.sub_tests_with_status(Status::Fail) {
                self.failures
                    .push(FailureBlock::from_entry(sub).render(&self.styles));
            }
        }

        Ok(())
    }

    /// Record a line that could not be decoded
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Unparsable`] once more than
    /// [`MAX_DECODE_ERRORS`] lines were recorded; the explanation is written
    /// to the report first.
    pub fn malformed(&mut self, line: String) -> Result<(), ReportError> {
        let errors = self.summary.decode_errors;
        if errors > MAX_DECODE_ERRORS {
            warn!(errors, "too many malformed lines, giving up");
            writeln!(self.out, "{UNPARSABLE_MESSAGE}")?;
            self.out.flush()?;
            return Err(ReportError::Unparsable { errors });
        }

        self.errors.push(line);
        self.summary.decode_errors += 1;
        Ok(())
    }

    /// Record a line of compiler output
    ///
    /// Listed under `Errors:` with the malformed lines, but never counted
    /// as a decode error.
    pub fn build_output(&mut self, line: String) {
        self.errors.push(line);
    }

    /// Record entries flushed at end of stream without a terminal event
    pub fn incomplete(&mut self, entries: Vec<TestEntry>) {
        debug!(count = entries.len(), "recording incomplete entries");
        self.summary.incomplete += entries.len();
        self.incomplete.extend(
            entries
                .iter()
                .map(|entry| incomplete_block(entry, &self.styles)),
        );
    }

    /// Write the buffered sections and the summary
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    pub fn finish(&mut self) -> Result<Summary, ReportError> {
        let styles = &self.styles;
        let mut report = String::new();

        if !self.skips.is_empty() {
            report.push('\n');
            report.push_str(&self.skips.join("\n"));
        }

        if !self.failures.is_empty() {
            report.push('\n');
            report.push_str(&self.failures.join("\n"));
        }

        if !self.package_logs.is_empty() {
            report.push('\n');
            report.push_str(&styles.style("Logs:", Role::Info));
            report.push('\n');
            for line in &self.package_logs {
                report.push_str(&format!("Log: {line}\n"));
            }
        }

        if !self.incomplete.is_empty() {
            report.push('\n');
            report.push_str(&styles.style("Incomplete:", Role::Warning));
            report.push('\n');
            report.push_str(&self.incomplete.join("\n"));
        }

        if !self.errors.is_empty() {
            report.push('\n');
            report.push_str(&styles.style("Errors:", Role::Error));
            report.push('\n');
            report.push_str(&self.errors.join("\n"));
            report.push('\n');
        }

        report.push('\n');
        report.push_str(&self.summary.render(styles));
        report.push('\n');

        self.out.write_all(report.as_bytes())?;
        self.out.flush()?;

        Ok(self.summary)
    }

    fn count(&mut self, status: Status) {
        match status {
            Status::Pass => self.summary.passed += 1,
            Status::Fail => self.summary.failed += 1,
            Status::Skip => self.summary.skipped += 1,
            Status::Running => {}
        }
    }

    fn package(&mut self, entry: &TestEntry) -> Result<(), ReportError> {
        let styles = &self.styles;
        let pkg = &entry.package;

        if !entry.flags.cached {
            self.summary.elapsed += entry.elapsed;
        }

        let line = match entry.status {
            Status::Pass if entry.flags.cached => {
                format!("{}\t{pkg}\t(cached)", styles.style("ok", Role::Success))
            }
            Status::Pass => format!(
                "{}\t{pkg}\t{:.2}s",
                styles.style("ok", Role::Success),
                entry.elapsed
            ),
            Status::Skip if entry.flags.no_test_files => {
                format!("{}\t{pkg}\t[no test files]", styles.style("?", Role::Warning))
            }
            Status::Skip => format!("{}\t{pkg}", styles.style("?", Role::Warning)),
            Status::Fail if entry.flags.build_failed => {
                styles.style(&format!("FAIL\t{pkg}\t[build failed]"), Role::Error)
            }
            Status::Fail => format!("{}\t{pkg}", styles.style("FAIL", Role::Error)),
            Status::Running => return Ok(()),
        };

        if entry.status == Status::Fail {
            self.summary.failed_packages += 1;
            self.package_logs.extend(entry.log_lines.iter().cloned());
        }

        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// `--- SKIP <name> (<elapsed>s)` plus the skip location, if any
fn skip_block(entry: &TestEntry, styles: &Styles) -> String {
    let header = format!("--- SKIP {} ({:.2}s)", entry.name, entry.elapsed);
    let mut block = styles.style(&header, Role::Warning);
    block.push('\n');

    let location = entry
        .raw_output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty());

    if let Some(location) = location {
        let location = location.strip_suffix(':').unwrap_or(location);
        block.push('\t');
        block.push_str(&styles.style(location, Role::Warning));
        block.push('\n');
    }

    block
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Running => "--- RUNNING",
        Status::Pass => "--- PASS",
        Status::Fail => "--- FAIL",
        Status::Skip => "--- SKIP",
    }
}

/// Block for an entry that never finished, with its unfinished subtests
fn incomplete_block(entry: &TestEntry, styles: &Styles) -> String {
    let name = if entry.is_package() {
        &entry.package
    } else {
        &entry.name
    };

    let mut block = format!(
        "{} {name} ({:.2}s)\n",
        styles.style(status_label(entry.status), Role::Warning),
        entry.elapsed
    );

    let mut body = Diagnostic::parse(&entry.raw_output).render(styles);
    body.extend(entry.log_lines.iter().cloned());
    if !body.is_empty() {
        block.push_str(&body.join("\n"));
        block.push('\n');
    }

    for sub in entry.sub_tests.iter().filter(|sub| sub.status != Status::Pass) {
        block.push_str(&incomplete_block(sub, styles));
    }

    block
}
