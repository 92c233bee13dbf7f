// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gotidy-events

use thiserror::Error;

/// Errors that can occur while decoding the event stream
#[derive(Debug, Error)]
pub enum EventsError {
    /// A line could not be decoded into an event
    #[error("Malformed event line: {line}")]
    Decode {
        /// The offending raw line, exactly as read
        line: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Error reading the event stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EventsError {
    /// The raw line that failed to decode, if this is a decode failure
    #[must_use]
    pub fn raw_line(&self) -> Option<&str> {
        match self {
            Self::Decode { line, .. } => Some(line),
            Self::Io(_) => None,
        }
    }
}
