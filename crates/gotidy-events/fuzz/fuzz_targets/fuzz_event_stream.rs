// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the event stream
//!
//! Feeds arbitrary lines through the decoder and the aggregator.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gotidy_events::{Aggregator, decode_line};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut aggregator = Aggregator::new();

        // Malformed lines are errors, never panics
        for line in input.lines() {
            if let Ok(Some(event)) = decode_line(line) {
                let _ = aggregator.apply(event);
            }
        }

        let _ = aggregator.finish();
    }
});
