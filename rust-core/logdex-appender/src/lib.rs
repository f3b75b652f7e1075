// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Appender crate
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Writes log records to the live generation and keeps its offset index in
// step. Each record's index entry carries the live file's length captured
// immediately before the record's bytes are written, taken from the same
// counter the writer advances.
//
// # Components
//
// - `IndexedAppender`: the write coordinator. Appends, commits, rotations and
//   close are serialized on one lock around generation 0.
// - `RotationCoordinator`: freezes generation 0, renumbers frozen
//   generations and opens a fresh live generation, notifying observers.
// - `Committer`: background task publishing the live index on a fixed
//   period, stopped and joined with `shutdown().await`.
// - `FieldHook`: decides what becomes searchable for each record.
//
// ## Usage
//
// ```no_run
// use logdex_appender::{AppenderConfig, IndexedAppender, LogRecord};
//
// let config = AppenderConfig::new("/var/log/app/app.log").with_max_backup_index(3);
// let appender = IndexedAppender::open(config).unwrap();
// appender
//     .append_record(&LogRecord::new("user logged in\n").with_context_id("session42"))
//     .unwrap();
// appender.close().unwrap();
// ```

pub mod appender;
pub mod committer;
pub mod config;
pub mod error;
mod live;
pub mod record;
pub mod rotation;
pub mod sink;

pub use appender::{AppenderBuilder, AppenderStatsSnapshot, IndexedAppender};
pub use committer::Committer;
pub use config::{AppenderConfig, DEFAULT_FLUSH_INTERVAL_MILLIS, DEFAULT_MAX_FILE_SIZE};
pub use error::{AppendError, AppendResult};
pub use live::RecordPlacement;
pub use record::{DefaultFieldHook, FieldHook, LogRecord, MessageFieldHook};
pub use rotation::RotationCoordinator;
pub use sink::{LogSink, RollingLogFile};
