// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// Fuzz target for query expression validation

#![no_main]

use libfuzzer_sys::fuzz_target;
use logdex_index::{parse_query, Analyzer};

fuzz_target!(|data: &[u8]| {
    if let Ok(expression) = std::str::from_utf8(data) {
        // Malformed expressions must come back as errors, never panics
        for analyzer in [Analyzer::Whitespace, Analyzer::Raw, Analyzer::Default] {
            let _ = parse_query(expression, analyzer);
        }
    }
});
