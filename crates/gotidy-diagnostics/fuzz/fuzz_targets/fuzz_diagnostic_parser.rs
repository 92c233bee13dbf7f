// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the diagnostic parser
//!
//! Any captured output must classify and render without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gotidy_diagnostics::{Diagnostic, Styles};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let diagnostic = Diagnostic::parse(text);
        let _ = diagnostic.render(&Styles::plain());
        let _ = diagnostic.render(&Styles::colorized());
    }
});
