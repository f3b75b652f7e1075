// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Query - Range query engine
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// For each generation present on disk the engine runs the query against
// that generation's index, then turns every match into a byte range using
// the generation's full offset list: a record ends where the next recorded
// offset begins, and the last record runs to the current end of file.
//
// Two signals mark a scan as stale. An in-process `RotationEpoch` changes
// when the appender starts a rotation. Without one, each generation's log
// file is stamped (length, modification time) before it is read and checked
// afterwards: a frozen file never changes, and a live file only grows, so
// anything else means the numbering moved.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use logdex_generations::{GenerationError, GenerationInfo, GenerationLayout, GenerationSet};
use logdex_index::{parse_query, IndexError, IndexSnapshot};
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::epoch::RotationEpoch;
use crate::error::{QueryError, QueryResult};
use crate::hit::{RangeHit, SearchOutcome};

/// Resolves keyword queries to byte ranges across all generations.
#[derive(Debug)]
pub struct RangeQueryEngine {
    config: SearchConfig,
    generations: GenerationSet,
    epoch: Option<Arc<RotationEpoch>>,
}

impl RangeQueryEngine {
    pub fn new(config: SearchConfig) -> Self {
        let layout = GenerationLayout::new(&config.log_path);
        let generations = GenerationSet::new(layout, config.max_backup_index);
        Self {
            config,
            generations,
            epoch: None,
        }
    }

    /// Observe rotations of an appender running in this process.
    pub fn with_epoch(mut self, epoch: Arc<RotationEpoch>) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn generations(&self) -> &GenerationSet {
        &self.generations
    }

    /// Search every generation from the live one to the oldest kept.
    pub fn search(&self, expression: &str) -> QueryResult<SearchOutcome> {
        self.search_generations(expression, 0..=self.config.max_backup_index)
    }

    /// Search the given generations in the given order.
    ///
    /// The expression is parsed before anything is read, so a syntax error
    /// never comes with partial output. Generations absent from disk are
    /// passed over; generations with only one of their two artifacts, or
    /// whose log file disappears, are skipped with a warning.
    pub fn search_generations(
        &self,
        expression: &str,
        generations: impl IntoIterator<Item = u32>,
    ) -> QueryResult<SearchOutcome> {
        parse_query(expression, self.config.analyzer)?;

        let start_epoch = self.current_epoch();
        let mut outcome = SearchOutcome::default();

        for generation in generations {
            let info = self.generations.info(generation)?;
            if info.is_absent() {
                debug!(generation, "Generation not on disk");
                continue;
            }
            if !info.is_complete() {
                self.skip(&mut outcome, &info, "log file or index missing");
                continue;
            }

            let before = FileStamp::read(&info.log_path);
            let scanned = self.scan_generation(&info, expression);
            let after = FileStamp::read(&info.log_path);

            let moved = match (before, after) {
                (Some(before), Some(after)) => before.moved(&after, generation),
                (Some(_), None) => true,
                _ => false,
            };
            if moved || self.current_epoch() != start_epoch {
                warn!(
                    generation,
                    partial = outcome.hits.len(),
                    "Rotation observed during scan"
                );
                return Err(QueryError::StaleScan {
                    generation,
                    partial: outcome.hits,
                });
            }

            match scanned {
                Ok(hits) => {
                    debug!(generation, hits = hits.len(), "Scanned generation");
                    outcome.hits.extend(hits);
                }
                Err(QueryError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    self.skip(&mut outcome, &info, "log file disappeared");
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            expression,
            hits = outcome.hits.len(),
            skipped = outcome.skipped.len(),
            "Range query complete"
        );
        Ok(outcome)
    }

    fn skip(&self, outcome: &mut SearchOutcome, info: &GenerationInfo, reason: &str) {
        let error = GenerationError::MissingGeneration(info.generation);
        warn!(
            generation = info.generation,
            log = %info.log_path.display(),
            %error,
            reason,
            "Skipping generation"
        );
        outcome.skipped.push(info.generation);
    }

    fn scan_generation(&self, info: &GenerationInfo, expression: &str) -> QueryResult<Vec<RangeHit>> {
        let snapshot = match IndexSnapshot::open(&info.index_path) {
            Ok(snapshot) => snapshot,
            // A freshly created generation has a directory but no index yet.
            Err(IndexError::NotFound(_)) => {
                debug!(generation = info.generation, "Index not initialised, no entries");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        let matches = snapshot.query(expression)?;
        if matches.len() == 0 {
            return Ok(Vec::new());
        }
        let offsets = snapshot.offsets()?;

        let path = &info.log_path;
        let mut file = File::open(path).map_err(|e| io_error(path, e))?;
        let file_len = file.metadata().map_err(|e| io_error(path, e))?.len();

        let mut hits = Vec::with_capacity(matches.len());
        for entry in matches {
            let next = offsets.partition_point(|&o| o <= entry.offset);
            let (end, last_record) = match offsets.get(next) {
                Some(&end) => (end, false),
                None => (file_len, true),
            };
            if end < entry.offset {
                warn!(
                    generation = info.generation,
                    offset = entry.offset,
                    file_len,
                    "Offset beyond end of log file, skipping match"
                );
                continue;
            }

            let bytes = read_range(&mut file, entry.offset, end).map_err(|e| io_error(path, e))?;
            let text = self.config.charset.decode(&bytes);
            hits.push(RangeHit {
                generation: info.generation,
                start: entry.offset,
                end,
                record_id: entry.record_id,
                timestamp_millis: entry.timestamp_millis,
                fields: entry.fields,
                last_record,
                bytes,
                text,
            });
        }
        Ok(hits)
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.as_ref().map_or(0, |epoch| epoch.current())
    }
}

fn read_range(file: &mut File, start: u64, end: u64) -> std::io::Result<Vec<u8>> {
    let len = end - start;
    file.seek(SeekFrom::Start(start))?;
    let mut bytes = Vec::with_capacity(len as usize);
    file.by_ref().take(len).read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn io_error(path: &Path, source: std::io::Error) -> QueryError {
    QueryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Identity of a log file as seen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn read(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    /// Whether `later` belongs to a different file than `self`.
    fn moved(&self, later: &FileStamp, generation: u32) -> bool {
        if generation == 0 {
            later.len < self.len
        } else {
            later != self
        }
    }
}
