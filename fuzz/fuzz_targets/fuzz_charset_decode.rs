// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// Fuzz target for decoding arbitrary log bytes

#![no_main]

use libfuzzer_sys::fuzz_target;
use logdex_query::Charset;

fuzz_target!(|data: &[u8]| {
    // Single-byte charsets decode one char per byte
    assert_eq!(Charset::Latin1.decode(data).chars().count(), data.len());
    assert_eq!(Charset::UsAscii.decode(data).chars().count(), data.len());

    let text = Charset::Utf8.decode(data);
    if let Ok(valid) = std::str::from_utf8(data) {
        assert_eq!(text, valid);
    }
});
