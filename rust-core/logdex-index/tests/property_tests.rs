// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Property-based tests for the offset index

use proptest::prelude::*;
use logdex_index::{Analyzer, IndexEntry, IndexFields, IndexSnapshot, OffsetIndex, OpenMode};
use tempfile::TempDir;

/// Generate record lengths; offsets are their running sums.
fn arb_lengths() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..500, 0..40)
}

/// Generate record identifiers
fn arb_id() -> impl Strategy<Value = String> {
    "[a-z]{3,8}[0-9]{1,3}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_committed_offsets_match_appended(lengths in arb_lengths(), id in arb_id()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("idx");
        let mut index = OffsetIndex::open(&path, Analyzer::Whitespace, OpenMode::OpenOrCreate).unwrap();

        let mut expected = Vec::new();
        let mut offset = 0u64;
        for (i, len) in lengths.iter().enumerate() {
            let entry = IndexEntry::at(offset, i as u64, IndexFields::new(id.clone()));
            index.append(&entry).unwrap();
            expected.push(offset);
            offset += len;
        }
        index.close().unwrap();

        let snapshot = IndexSnapshot::open(&path).unwrap();
        prop_assert_eq!(snapshot.offsets().unwrap(), expected.clone());

        let matched: Vec<u64> = snapshot.query(&id).unwrap().map(|e| e.offset).collect();
        prop_assert_eq!(matched, expected);
    }
}
