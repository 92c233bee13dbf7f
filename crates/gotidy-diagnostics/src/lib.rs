// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gotidy-diagnostics: failure text reformatting for gotidy
//!
//! This library crate turns the raw output captured for a failed Go test
//! into compact report text.
//!
//! ## Recognised layouts
//!
//! - `file.go:42: message` locations, split into location and message
//! - testify assertion reports (`Error Trace:` / `Error:` / `Test:` /
//!   `Messages:`), reflowed with diff lines tagged by polarity
//! - panic output and its stack trace
//!
//! Everything else passes through unchanged.
//!
//! ## Styling
//!
//! All coloring goes through [`Styles::style`]; [`Styles::plain`] produces
//! escape-free text.
//!
//! ```
//! use gotidy_diagnostics::{Diagnostic, Styles};
//!
//! let diagnostic = Diagnostic::parse("    sum_test.go:12: got 3, want 4\n");
//! assert_eq!(
//!     diagnostic.render(&Styles::plain()),
//!     vec!["\tsum_test.go:12: got 3, want 4".to_string()]
//! );
//! ```

#![warn(missing_docs)]

pub mod assertion;
pub mod diagnostic;
pub mod scanner;
pub mod style;

pub use assertion::{AssertionBlock, ErrorLine, indent_width, is_assertion_start};
pub use diagnostic::{Diagnostic, DiagnosticLine, FailureBlock};
pub use scanner::RewindScanner;
pub use style::{Role, Styles};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::diagnostic::{Diagnostic, FailureBlock};
    pub use crate::style::{Role, Styles};
}
