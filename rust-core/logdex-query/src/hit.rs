// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Query - Range hits
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::collections::BTreeMap;

use serde::Serialize;

/// One matching record, resolved to its bytes in a generation's log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeHit {
    /// Generation the record lives in (0 = live).
    pub generation: u32,
    /// First byte of the record.
    pub start: u64,
    /// One past the last byte of the record.
    pub end: u64,
    pub record_id: String,
    pub timestamp_millis: u64,
    /// Custom fields stored with the entry.
    pub fields: BTreeMap<String, String>,
    /// The record is the last indexed one in its generation; its range runs
    /// to the end of the file and may include bytes of untracked records.
    pub last_record: bool,
    /// Raw bytes of the range.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// The bytes decoded with the configured charset.
    pub text: String,
}

impl RangeHit {
    /// Length of the range in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The result of a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Hits in scan order: by generation as requested, then by timestamp.
    pub hits: Vec<RangeHit>,
    /// Generations that were only partly present on disk and were skipped.
    pub skipped: Vec<u32>,
}
