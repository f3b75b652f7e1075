// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Appender - Generation zero
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Everything that mutates the live generation lives behind one lock: the
// log sink (and with it the authoritative length counter) and the writable
// offset index. Appends, commits and rotations all take `&mut LiveGeneration`,
// so holding the lock is the only way to reach either artifact.

use std::path::PathBuf;

use logdex_index::{Analyzer, IndexEntry, IndexFields, OffsetIndex};
use tracing::{debug, warn};

use crate::error::{AppendError, AppendResult};
use crate::sink::LogSink;

/// Where an appended record landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPlacement {
    /// Byte offset of the record in the live log file.
    pub offset: u64,
    /// Record length in bytes.
    pub len: u64,
    /// Whether an index entry was inserted for the record.
    pub indexed: bool,
}

/// The live log sink and its offset index.
pub(crate) struct LiveGeneration {
    pub(crate) sink: Box<dyn LogSink>,
    pub(crate) index: Option<OffsetIndex>,
    pub(crate) index_path: PathBuf,
    pub(crate) analyzer: Analyzer,
    pub(crate) closed: bool,
}

/// What happened to the index side of an append.
pub(crate) enum IndexOutcome {
    Inserted,
    /// Empty records are written but not indexed.
    Skipped,
    Failed,
}

impl LiveGeneration {
    pub(crate) fn new(
        sink: Box<dyn LogSink>,
        index: Option<OffsetIndex>,
        index_path: PathBuf,
        analyzer: Analyzer,
    ) -> Self {
        Self {
            sink,
            index,
            index_path,
            analyzer,
            closed: false,
        }
    }

    /// Capture the offset, insert the entry, then write the bytes.
    ///
    /// The index insert happens before the physical write so that the offset
    /// always describes the write that follows it. An index failure is
    /// reported through the outcome; only a log write failure is an error.
    pub(crate) fn append(
        &mut self,
        bytes: &[u8],
        fields: impl FnOnce(u64) -> IndexFields,
    ) -> AppendResult<(RecordPlacement, IndexOutcome)> {
        if self.closed {
            return Err(AppendError::Closed);
        }

        let offset = self.sink.current_length();
        let outcome = if bytes.is_empty() {
            IndexOutcome::Skipped
        } else {
            self.insert(IndexEntry::new(offset, fields(offset)))
        };

        if let Err(err) = self.sink.write_record(bytes) {
            if matches!(outcome, IndexOutcome::Inserted) && self.sink.current_length() == offset {
                self.retract(offset);
            }
            return Err(err.into());
        }

        let placement = RecordPlacement {
            offset,
            len: bytes.len() as u64,
            indexed: matches!(outcome, IndexOutcome::Inserted),
        };
        Ok((placement, outcome))
    }

    fn insert(&mut self, entry: IndexEntry) -> IndexOutcome {
        if self.index.is_none() {
            if let Err(err) = self.reopen_index() {
                warn!(path = %self.index_path.display(), error = %err, "Live index unavailable, record not searchable");
                return IndexOutcome::Failed;
            }
        }
        let Some(index) = self.index.as_mut() else {
            return IndexOutcome::Failed;
        };
        match index.append(&entry) {
            Ok(()) => IndexOutcome::Inserted,
            Err(err) => {
                warn!(offset = entry.offset, error = %err, "Index append failed, record not searchable");
                IndexOutcome::Failed
            }
        }
    }

    fn retract(&mut self, offset: u64) {
        if let Some(index) = self.index.as_mut() {
            if let Err(err) = index.retract(offset) {
                warn!(offset, error = %err, "Could not retract entry for unwritten record");
            }
        }
    }

    /// Publish pending entries. A failed commit drops the handle; the next
    /// append or commit reopens it with recovery.
    pub(crate) fn commit(&mut self) -> AppendResult<u64> {
        if self.closed {
            return Err(AppendError::Closed);
        }
        if self.index.is_none() {
            self.reopen_index()?;
        }
        let Some(index) = self.index.as_mut() else {
            return Ok(0);
        };
        match index.commit() {
            Ok(published) => Ok(published),
            Err(err) => {
                self.index = None;
                Err(err.into())
            }
        }
    }

    /// Close the index, committing what it holds.
    pub(crate) fn close_index(&mut self) -> AppendResult<()> {
        if let Some(index) = self.index.take() {
            index.close()?;
        }
        Ok(())
    }

    pub(crate) fn reopen_index(&mut self) -> AppendResult<()> {
        let index = OffsetIndex::open_with_recovery(&self.index_path, self.analyzer)?;
        debug!(path = %self.index_path.display(), "Opened live index");
        self.index = Some(index);
        Ok(())
    }

    /// Release both artifacts for good.
    pub(crate) fn shutdown(&mut self) -> AppendResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let index_result = self.close_index();
        self.sink.close()?;
        index_result
    }
}

impl std::fmt::Debug for LiveGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveGeneration")
            .field("length", &self.sink.current_length())
            .field("index", &self.index)
            .field("closed", &self.closed)
            .finish()
    }
}
