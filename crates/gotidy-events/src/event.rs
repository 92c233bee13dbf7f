// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Event decoding for `go test -json` output
//!
//! Each line of a `go test -json` (test2json) stream is one JSON object:
//!
//! ```text
//! {"Time":"2025-03-31T14:59:44Z","Action":"output","Package":"example.com/app","Test":"TestA","Output":"    a_test.go:12: boom\n"}
//! ```
//!
//! [`decode_line`] turns such a line into an [`Event`], and [`EventReader`]
//! does the same for a whole buffered reader.

use std::io::BufRead;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EventsError;

/// The action recorded by a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// The test has started running
    Run,
    /// The test binary is about to be executed
    Start,
    /// The test has been paused
    Pause,
    /// The test has continued running
    #[serde(rename = "cont")]
    Continue,
    /// Benchmark result marker
    Bench,
    /// The test printed output
    Output,
    /// The test passed
    Pass,
    /// The test failed
    Fail,
    /// The test was skipped or the package had no tests
    Skip,
    /// Compiler output for a test binary that is being built
    #[serde(rename = "build-output")]
    BuildOutput,
    /// Building a test binary failed
    #[serde(rename = "build-fail")]
    BuildFail,
    /// An action this decoder does not know about
    #[serde(other)]
    Other,
}

impl Action {
    /// Actions that carry nothing the aggregator needs
    ///
    /// `build-output` text is not part of any test entry; callers that want
    /// compiler errors read it from the event directly.
    #[must_use]
    pub fn is_ignored(self) -> bool {
        matches!(
            self,
            Self::Run
                | Self::Start
                | Self::Pause
                | Self::Continue
                | Self::Bench
                | Self::BuildOutput
                | Self::BuildFail
                | Self::Other
        )
    }

    /// Pass, fail and skip end accumulation for an identity
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Pass | Self::Fail | Self::Skip)
    }
}

/// A single decoded test2json event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    /// When the event was emitted
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    /// What happened
    pub action: Action,
    /// Import path of the package under test
    #[serde(default)]
    pub package: String,
    /// Test name; empty for package-level events
    #[serde(default)]
    pub test: String,
    /// Elapsed seconds reported by this event
    #[serde(default)]
    pub elapsed: f64,
    /// Output text, including its trailing newline
    #[serde(default)]
    pub output: String,
    /// Test binary being built, set on `build-output` and `build-fail`
    #[serde(default)]
    pub import_path: String,
}

impl Event {
    /// Create an event with no timestamp, elapsed time or output
    #[must_use]
    pub fn new(action: Action, package: &str, test: &str) -> Self {
        Self {
            time: None,
            action,
            package: package.to_string(),
            test: test.to_string(),
            elapsed: 0.0,
            output: String::new(),
            import_path: String::new(),
        }
    }

    /// Set the elapsed seconds
    #[must_use]
    pub fn with_elapsed(mut self, elapsed: f64) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Set the output text
    #[must_use]
    pub fn with_output(mut self, output: &str) -> Self {
        self.output = output.to_string();
        self
    }

    /// Identity key shared by every event of the same test or package
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.package, &self.test)
    }
}

/// Identity of a test or package within the stream: `(package, test)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    /// Package import path
    pub package: String,
    /// Test name; empty for the package itself
    pub test: String,
}

impl EntryKey {
    /// Build a key from its parts
    #[must_use]
    pub fn new(package: &str, test: &str) -> Self {
        Self {
            package: package.to_string(),
            test: test.to_string(),
        }
    }
}

/// Decode one line of test2json output
///
/// Returns `Ok(None)` for blank lines.
///
/// # Errors
///
/// Returns `EventsError::Decode` carrying the raw line if it is not a valid
/// event. Unknown actions decode as [`Action::Other`].
pub fn decode_line(line: &str) -> Result<Option<Event>, EventsError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| EventsError::Decode {
            line: line.to_string(),
            source,
        })
}

/// Iterator over the events of a buffered reader
///
/// Blank lines are skipped; malformed lines are yielded as errors and do not
/// end iteration.
pub struct EventReader<R: BufRead> {
    lines: std::io::Lines<R>,
}

impl<R: BufRead> EventReader<R> {
    /// Create a new event reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<Event, EventsError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(EventsError::from(err))),
            };

            match decode_line(&line) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
