// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for report rendering
//!
//! Feeds arbitrary lines through the aggregator into the renderer, the same
//! sequence of calls the pipeline makes.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gotidy::render::Renderer;
use gotidy_diagnostics::Styles;
use gotidy_events::{Aggregator, decode_line};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let mut aggregator = Aggregator::new();
    let mut renderer = Renderer::new(Vec::new(), Styles::colorized());

    for line in input.lines() {
        let result = match decode_line(line) {
            Ok(Some(event)) => match aggregator.apply(event) {
                Some(entry) => renderer.entry(entry),
                None => Ok(()),
            },
            Ok(None) => Ok(()),
            Err(_) => renderer.malformed(line.to_string()),
        };

        // Giving up on unparsable input is expected
        if result.is_err() {
            return;
        }
    }

    renderer.incomplete(aggregator.finish());
    let _ = renderer.finish();
});
