// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Appender - Write coordinator
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `IndexedAppender` owns generation 0. Every mutation (append, commit,
// rotation, close) runs under the single `live` mutex, so the offset read
// from the sink and the write it describes can never be separated by a
// rotation or a commit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use logdex_generations::{GenerationLayout, GenerationSet, RotationObserver, RotationObservers};
use logdex_index::OffsetIndex;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::AppenderConfig;
use crate::error::{AppendError, AppendResult};
use crate::live::{IndexOutcome, LiveGeneration, RecordPlacement};
use crate::record::{DefaultFieldHook, FieldHook, LogRecord};
use crate::rotation::RotationCoordinator;
use crate::sink::{LogSink, RollingLogFile};

/// Counters kept by the write coordinator.
#[derive(Debug, Default)]
struct AppenderStats {
    records: AtomicU64,
    indexed: AtomicU64,
    index_failures: AtomicU64,
    commits: AtomicU64,
    commit_failures: AtomicU64,
    rotation_failures: AtomicU64,
}

/// A point-in-time copy of the appender's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppenderStatsSnapshot {
    pub records: u64,
    pub indexed: u64,
    pub index_failures: u64,
    pub commits: u64,
    pub commit_failures: u64,
    pub rotations: u64,
    pub rotation_failures: u64,
}

/// Builder for [`IndexedAppender`].
pub struct AppenderBuilder {
    config: AppenderConfig,
    hook: Arc<dyn FieldHook>,
    observers: RotationObservers,
    sink: Option<Box<dyn LogSink>>,
}

impl AppenderBuilder {
    /// Use `hook` to decide what becomes searchable.
    pub fn field_hook(mut self, hook: impl FieldHook + 'static) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    /// Register a rotation observer.
    pub fn observer(mut self, observer: Arc<dyn RotationObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Write through `sink` instead of a [`RollingLogFile`] on the live path.
    pub fn sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Prepare generation 0 on disk and open it.
    pub fn open(self) -> AppendResult<IndexedAppender> {
        let config = self.config;
        config.validate()?;

        let layout = GenerationLayout::new(&config.log_path);
        let generations = GenerationSet::new(layout, config.max_backup_index);
        if config.append {
            generations.ensure_live()?;
        } else {
            generations.reset_live()?;
        }

        let log_path = generations.layout().log_path(0);
        let index_path = generations.layout().index_path(0);

        let sink = match self.sink {
            Some(sink) => sink,
            None => Box::new(RollingLogFile::open(&log_path, config.max_file_size)?),
        };
        let index = OffsetIndex::open_with_recovery(&index_path, config.analyzer)?;

        info!(
            log = %log_path.display(),
            length = sink.current_length(),
            max_backup_index = config.max_backup_index,
            append = config.append,
            "Opened indexed appender"
        );

        let live = LiveGeneration::new(sink, Some(index), index_path, config.analyzer);
        Ok(IndexedAppender {
            config,
            live: Mutex::new(live),
            rotation: RotationCoordinator::new(generations, self.observers),
            hook: self.hook,
            stats: AppenderStats::default(),
        })
    }
}

/// Appends log records and keeps the live generation's offset index in step.
pub struct IndexedAppender {
    config: AppenderConfig,
    live: Mutex<LiveGeneration>,
    rotation: RotationCoordinator,
    hook: Arc<dyn FieldHook>,
    stats: AppenderStats,
}

impl IndexedAppender {
    /// Start building an appender for `config`.
    pub fn builder(config: AppenderConfig) -> AppenderBuilder {
        AppenderBuilder {
            config,
            hook: Arc::new(DefaultFieldHook),
            observers: RotationObservers::new(),
            sink: None,
        }
    }

    /// Open with the default field hook and no observers.
    pub fn open(config: AppenderConfig) -> AppendResult<Self> {
        Self::builder(config).open()
    }

    /// Append one record.
    ///
    /// The record's offset is the live file's length at the moment of the
    /// write. Index failures leave the record logged but not searchable; only
    /// a failed log write is returned as an error. When the write reaches the
    /// rollover size the generations are rotated before returning.
    pub fn append_record(&self, record: &LogRecord) -> AppendResult<RecordPlacement> {
        let mut live = self.live.lock();
        let (placement, outcome) =
            live.append(&record.body, |offset| self.hook.fields(offset, record))?;

        self.stats.records.fetch_add(1, Ordering::Relaxed);
        match outcome {
            IndexOutcome::Inserted => {
                self.stats.indexed.fetch_add(1, Ordering::Relaxed);
            }
            IndexOutcome::Failed => {
                self.stats.index_failures.fetch_add(1, Ordering::Relaxed);
            }
            IndexOutcome::Skipped => {}
        }

        if live.sink.should_roll() {
            debug!(length = live.sink.current_length(), "Rollover size reached");
            if let Err(err) = self.rotation.rotate(&mut live) {
                // The record is already written; the next append retries.
                self.stats.rotation_failures.fetch_add(1, Ordering::Relaxed);
                error!(error = %err, "Rotation after append failed");
            }
        }
        Ok(placement)
    }

    /// Make entries appended so far visible to readers.
    pub fn commit(&self) -> AppendResult<u64> {
        let mut live = self.live.lock();
        match live.commit() {
            Ok(published) => {
                self.stats.commits.fetch_add(1, Ordering::Relaxed);
                Ok(published)
            }
            Err(AppendError::Closed) => Err(AppendError::Closed),
            Err(err) => {
                self.stats.commit_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "Live index commit failed");
                Err(err)
            }
        }
    }

    /// Rotate now, regardless of the live file's size.
    pub fn rotate_now(&self) -> AppendResult<()> {
        let mut live = self.live.lock();
        if live.closed {
            return Err(AppendError::Closed);
        }
        self.rotation.rotate(&mut live)
    }

    /// Commit and release the live generation. Later calls fail with
    /// [`AppendError::Closed`](crate::AppendError::Closed).
    pub fn close(&self) -> AppendResult<()> {
        let mut live = self.live.lock();
        let was_open = !live.closed;
        live.shutdown()?;
        if was_open {
            info!(log = %self.config.log_path.display(), "Closed indexed appender");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.live.lock().closed
    }

    /// Current byte length of the live log file.
    pub fn live_length(&self) -> u64 {
        self.live.lock().sink.current_length()
    }

    pub fn config(&self) -> &AppenderConfig {
        &self.config
    }

    /// The generations on disk.
    pub fn generations(&self) -> &GenerationSet {
        self.rotation.generations()
    }

    pub fn stats(&self) -> AppenderStatsSnapshot {
        AppenderStatsSnapshot {
            records: self.stats.records.load(Ordering::Relaxed),
            indexed: self.stats.indexed.load(Ordering::Relaxed),
            index_failures: self.stats.index_failures.load(Ordering::Relaxed),
            commits: self.stats.commits.load(Ordering::Relaxed),
            commit_failures: self.stats.commit_failures.load(Ordering::Relaxed),
            rotations: self.rotation.rotations(),
            rotation_failures: self.stats.rotation_failures.load(Ordering::Relaxed),
        }
    }
}

impl Drop for IndexedAppender {
    fn drop(&mut self) {
        if let Err(err) = self.live.get_mut().shutdown() {
            warn!(error = %err, "Failed to close appender on drop");
        }
    }
}

impl std::fmt::Debug for IndexedAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedAppender")
            .field("config", &self.config)
            .field("rotation", &self.rotation)
            .finish()
    }
}
