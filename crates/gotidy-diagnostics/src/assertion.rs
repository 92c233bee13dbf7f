// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Structured assertion reports (testify layout)
//!
//! An assertion report is a block of labelled sections sharing one base
//! indentation:
//!
//! ```text
//!         Error Trace:    /src/app/expense_test.go:213
//!         Error:          Not equal:
//!                         expected: 1
//!                         actual  : 2
//!         Test:           TestExpense
//!         Messages:       totals differ
//! ```
//!
//! [`AssertionBlock::parse`] consumes such a block from a
//! [`RewindScanner`], handing back the first line that does not belong to it.

use tracing::trace;

use crate::scanner::RewindScanner;
use crate::style::{Role, Styles};

/// Label that opens an assertion report
pub const ASSERTION_MARKER: &str = "Error Trace:";

const ERROR_LABEL: &str = "Error:";
const MESSAGES_LABEL: &str = "Messages:";
const TEST_LABEL: &str = "Test:";

/// Whether `line` opens an assertion report
#[must_use]
pub fn is_assertion_start(line: &str) -> bool {
    line.trim_start().starts_with(ASSERTION_MARKER)
}

/// Number of leading spaces and tabs, each counting as one
#[must_use]
pub fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| matches!(c, ' ' | '\t')).count()
}

/// Remove the report's column padding from a section line
///
/// Sections are laid out as `<spaces>\t<spaces>\t<content>`: every leading
/// space goes, as do the first two leading tabs. Further tabs belong to the
/// content and are kept.
fn strip_padding(line: &str) -> String {
    let content = line.trim_start_matches([' ', '\t']);
    let padding = &line[..line.len() - content.len()];
    let tabs = padding.chars().filter(|c| *c == '\t').count();

    let mut out = "\t".repeat(tabs.saturating_sub(2));
    out.push_str(content);
    out
}

/// Replace a section label by blanks of the same width
fn blank_label(line: &str, label: &str) -> String {
    line.replacen(label, &" ".repeat(label.len()), 1)
}

/// One line of the error section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLine {
    /// Ordinary detail text
    Text(String),
    /// Diff line present only in the expected value
    Removed(String),
    /// Diff line present only in the actual value
    Added(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Trace,
    Error,
    Test,
    Message,
    Done,
}

/// A parsed assertion report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssertionBlock {
    /// First line of the error section, e.g. `Not equal:`
    pub kind: String,
    /// Remaining error lines, diff lines tagged by polarity
    pub error: Vec<ErrorLine>,
    /// Message section lines, if the assertion carried a message
    pub messages: Vec<String>,
    /// Stack of `file:line` locations
    pub trace: Vec<String>,
}

impl AssertionBlock {
    /// Parse a block whose first line (`Error Trace: ...`) was already read
    ///
    /// Reads from `scanner` until the block ends. A line that ends the block
    /// by dedenting is pushed back so the caller sees it exactly once.
    pub fn parse<'a, I>(first_line: &str, scanner: &mut RewindScanner<I>) -> Self
    where
        I: Iterator<Item = &'a str>,
    {
        let base_indent = indent_width(first_line);
        let mut trace = vec![first_line.trim().to_string()];
        let mut error_lines: Vec<&str> = Vec::new();
        let mut message_lines: Vec<&str> = Vec::new();
        let mut state = State::Trace;

        while state != State::Done {
            let Some(line) = scanner.next() else {
                break;
            };

            let trimmed = line.trim();
            let indent = indent_width(line);
            let same_indent = indent == base_indent;
            let dedented = !trimmed.is_empty() && indent < base_indent;

            state = match state {
                State::Trace if same_indent && trimmed.starts_with(ERROR_LABEL) => {
                    error_lines.push(line);
                    State::Error
                }
                State::Trace | State::Error if dedented => {
                    scanner.rewind();
                    State::Done
                }
                State::Trace => {
                    trace.push(trimmed.to_string());
                    State::Trace
                }
                State::Error if same_indent && trimmed.starts_with(TEST_LABEL) => State::Test,
                State::Error | State::Test
                    if same_indent && trimmed.starts_with(MESSAGES_LABEL) =>
                {
                    message_lines.push(line);
                    State::Message
                }
                State::Error => {
                    error_lines.push(line);
                    State::Error
                }
                State::Test => {
                    scanner.rewind();
                    State::Done
                }
                State::Message if indent <= base_indent => {
                    scanner.rewind();
                    State::Done
                }
                State::Message => {
                    message_lines.push(line);
                    State::Message
                }
                State::Done => State::Done,
            };
        }

        trace!(
            trace = trace.len(),
            error = error_lines.len(),
            messages = message_lines.len(),
            "parsed assertion block"
        );

        let mut block = Self {
            trace: Self::clean_trace(trace),
            messages: Self::clean_messages(&message_lines),
            ..Default::default()
        };
        block.set_error(&error_lines);
        block
    }

    fn clean_trace(mut trace: Vec<String>) -> Vec<String> {
        if let Some(first) = trace.first_mut() {
            *first = first.replacen(ASSERTION_MARKER, "", 1).trim().to_string();
        }
        trace.retain(|line| !line.is_empty());
        trace
    }

    fn clean_messages(lines: &[&str]) -> Vec<String> {
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    strip_padding(&blank_label(line, MESSAGES_LABEL))
                } else {
                    strip_padding(line)
                }
            })
            .collect()
    }

    fn set_error(&mut self, lines: &[&str]) {
        let Some((first, rest)) = lines.split_first() else {
            return;
        };

        let first = blank_label(first, ERROR_LABEL);
        let base_indent = indent_width(&first);
        self.kind = first.trim().to_string();

        for line in rest {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                self.error.push(ErrorLine::Text(String::new()));
                continue;
            }

            let indent = indent_width(line);
            let mut text = strip_padding(line);

            // Context lines of a diff start with a single space
            if indent == base_indent + 1 {
                text.insert(0, ' ');
            }

            let tagged = if indent == base_indent && trimmed.starts_with('-') {
                ErrorLine::Removed(text)
            } else if indent == base_indent && trimmed.starts_with('+') {
                ErrorLine::Added(text)
            } else {
                ErrorLine::Text(text)
            };
            self.error.push(tagged);
        }
    }

    /// Render the block as tab-indented report text, without a final newline
    #[must_use]
    pub fn render(&self, styles: &Styles) -> String {
        let mut out = String::new();

        if !self.kind.is_empty() || !self.error.is_empty() {
            out.push_str("\tError:\n\t\t");
            out.push_str(&styles.style(&self.kind, Role::Error));
            for line in &self.error {
                out.push_str("\n\t\t");
                match line {
                    ErrorLine::Text(text) => out.push_str(text),
                    ErrorLine::Removed(text) => out.push_str(&styles.style(text, Role::DiffRemoved)),
                    ErrorLine::Added(text) => out.push_str(&styles.style(text, Role::DiffAdded)),
                }
            }
            out.push('\n');
        }

        if !self.messages.is_empty() {
            out.push_str("\tMessages:");
            for line in &self.messages {
                out.push_str("\n\t\t");
                out.push_str(line);
            }
            out.push('\n');
        }

        out.push_str("\tError Trace:");
        for line in &self.trace {
            out.push_str("\n\t\t");
            out.push_str(line);
        }

        out
    }
}
