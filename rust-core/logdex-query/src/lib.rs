// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Query crate
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Turns keyword queries into exact byte ranges of matching log records,
// across the live generation and every frozen one still on disk. Offsets
// are only ever interpreted against the log file of their own generation.
//
// Reads are lock-free: frozen generations never change, and the live one is
// read through its last commit, so a query may trail recent appends by up
// to one commit interval.
//
// ## Usage
//
// ```no_run
// use logdex_query::{RangeQueryEngine, SearchConfig};
//
// let engine = RangeQueryEngine::new(SearchConfig::new("/var/log/app/app.log").with_max_backup_index(3));
// for hit in engine.search("session42").unwrap().hits {
//     print!("{}", hit.text);
// }
// ```

pub mod charset;
pub mod config;
pub mod engine;
pub mod epoch;
pub mod error;
pub mod hit;

pub use charset::Charset;
pub use config::SearchConfig;
pub use engine::RangeQueryEngine;
pub use epoch::RotationEpoch;
pub use error::{QueryError, QueryResult};
pub use hit::{RangeHit, SearchOutcome};
