// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gotidy-events: `go test -json` event processing for gotidy
//!
//! This library crate decodes test2json event streams and folds them into
//! hierarchical [`TestEntry`] values: packages, root tests, and the subtests
//! each root test owns.
//!
//! # Example
//!
//! ```
//! use gotidy_events::{Aggregator, decode_line};
//!
//! let mut aggregator = Aggregator::new();
//! let line = r#"{"Action":"pass","Package":"example.com/app","Elapsed":0.58}"#;
//!
//! if let Some(event) = decode_line(line).unwrap() {
//!     let entry = aggregator.apply(event).expect("package entries finalize immediately");
//!     assert!(entry.is_package());
//! }
//! ```

pub mod aggregator;
pub mod entry;
pub mod error;
pub mod event;

pub use aggregator::{Aggregator, OutputClass, classify_output};
pub use entry::{EntryFlags, Status, TestEntry, root_test_name};
pub use error::EventsError;
pub use event::{Action, EntryKey, Event, EventReader, decode_line};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregator::Aggregator;
    pub use crate::entry::{Status, TestEntry};
    pub use crate::error::EventsError;
    pub use crate::event::{Action, Event, decode_line};
}
