// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Offset Index crate
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Durable mapping from one log generation to the start offsets of its
// records, backed by a Tantivy index directory. Each entry carries the byte
// offset where a record begins, its insertion timestamp, a record
// identifier and optional caller-defined keyword fields.
//
// # Lifecycle
//
// The writer side (`OffsetIndex`) buffers appended entries in memory and
// publishes them on `commit()`; readers (`IndexSnapshot`) only ever see
// committed state. Opening for write takes Tantivy's exclusive writer lock.
//
// # Recovery
//
// Two failure causes are recoverable locally:
//
// - `CorruptIndex`: the storage is unreadable. Re-create the index
//   (`OpenMode::Recreate`); its entries are lost.
// - `LockHeld`: another live writer owns the index. Retry once, then fail.
//
// `OffsetIndex::open_with_recovery` applies both. Every other failure is
// returned to the caller.
//
// ## Usage
//
// ```no_run
// use logdex_index::{query, Analyzer, IndexEntry, IndexFields, OffsetIndex};
//
// let mut index = OffsetIndex::open_with_recovery("/tmp/app.log_idx", Analyzer::Whitespace).unwrap();
// index.append(&IndexEntry::new(0, IndexFields::new("session42"))).unwrap();
// index.commit().unwrap();
//
// for entry in query("/tmp/app.log_idx", "session42").unwrap() {
//     println!("record at offset {}", entry.offset);
// }
// ```

pub mod entry;
pub mod error;
pub mod reader;
pub mod schema;
pub mod store;

pub use entry::{now_millis, IndexEntry, IndexFields};
pub use error::{IndexError, IndexResult};
pub use reader::{parse_query, query, IndexMatches, IndexSnapshot};
pub use schema::{Analyzer, IndexSchema};
pub use store::{index_exists, OffsetIndex, OpenMode, LOCK_RETRY_DELAY};
