// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Appender - Rotation coordinator
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rotation runs with the live generation already locked by the caller:
//
// 1. Notify observers (pre-rotation signal)
// 2. Close the live index and release the live log file
// 3. Shift the generations on disk (or reset generation 0 when no backups
//    are kept)
// 4. Reopen the log file and a fresh index for generation 0
// 5. Notify observers that rotation finished
//
// If releasing the log file or the on-disk step fails, generation 0 is
// brought back to a writable state before the error is returned so later
// appends still reach a file.

use std::sync::atomic::{AtomicU64, Ordering};

use logdex_generations::{GenerationSet, RotationObservers};
use tracing::{error, info, warn};

use crate::error::AppendResult;
use crate::live::LiveGeneration;

/// Freezes the live generation and creates the next one.
#[derive(Debug)]
pub struct RotationCoordinator {
    generations: GenerationSet,
    observers: RotationObservers,
    rotations: AtomicU64,
}

impl RotationCoordinator {
    pub fn new(generations: GenerationSet, observers: RotationObservers) -> Self {
        Self {
            generations,
            observers,
            rotations: AtomicU64::new(0),
        }
    }

    /// The generations this coordinator renumbers.
    pub fn generations(&self) -> &GenerationSet {
        &self.generations
    }

    /// Number of rotations completed.
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    pub(crate) fn rotate(&self, live: &mut LiveGeneration) -> AppendResult<()> {
        self.observers.notify_started();
        let result = self.rotate_locked(live);
        self.observers.notify_finished();
        result
    }

    fn rotate_locked(&self, live: &mut LiveGeneration) -> AppendResult<()> {
        // Entries the index held are committed by close; losing them only
        // loses searchability, so rotation proceeds regardless.
        if let Err(err) = live.close_index() {
            warn!(error = %err, "Failed to close live index before rotation");
        }
        if let Err(err) = live.sink.close() {
            error!(error = %err, "Failed to release live log file, restoring live generation");
            self.recover_live(live);
            return Err(err.into());
        }

        if let Err(err) = self.generations.rotate() {
            error!(error = %err, "Generation rotation failed, restoring live generation");
            self.recover_live(live);
            return Err(err.into());
        }

        self.restore_live(live)?;
        let completed = self.rotations.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            rotations = completed,
            max_backup_index = self.generations.max_backup_index(),
            "Rotated live generation"
        );
        Ok(())
    }

    fn recover_live(&self, live: &mut LiveGeneration) {
        if let Err(err) = self.restore_live(live) {
            error!(error = %err, "Live generation could not be restored");
        }
    }

    fn restore_live(&self, live: &mut LiveGeneration) -> AppendResult<()> {
        self.generations.ensure_live()?;
        live.sink.reopen()?;
        live.reopen_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{LogSink, RollingLogFile};
    use logdex_generations::GenerationLayout;
    use logdex_index::{Analyzer, IndexFields, IndexSnapshot, OffsetIndex};
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn live_generation(set: &GenerationSet) -> LiveGeneration {
        set.ensure_live().unwrap();
        let layout = set.layout();
        let sink = RollingLogFile::open(layout.log_path(0), u64::MAX).unwrap();
        let index = OffsetIndex::open_with_recovery(layout.index_path(0), Analyzer::Whitespace).unwrap();
        LiveGeneration::new(Box::new(sink), Some(index), layout.index_path(0), Analyzer::Whitespace)
    }

    fn write(live: &mut LiveGeneration, text: &str) {
        live.append(text.as_bytes(), |_| IndexFields::new("t")).unwrap();
    }

    #[test]
    fn test_rotation_freezes_live_generation() {
        let dir = TempDir::new().unwrap();
        let set = GenerationSet::new(GenerationLayout::new(dir.path().join("app.log")), 2);
        let coordinator = RotationCoordinator::new(set.clone(), RotationObservers::new());
        let mut live = live_generation(&set);

        write(&mut live, "one\n");
        write(&mut live, "two\n");
        coordinator.rotate(&mut live).unwrap();

        assert_eq!(coordinator.rotations(), 1);
        assert_eq!(live.sink.current_length(), 0);
        assert_eq!(std::fs::read(set.layout().log_path(1)).unwrap(), b"one\ntwo\n");
        let frozen = IndexSnapshot::open(set.layout().index_path(1)).unwrap();
        assert_eq!(frozen.offsets().unwrap(), vec![0, 4]);

        write(&mut live, "three\n");
        live.commit().unwrap();
        let current = IndexSnapshot::open(set.layout().index_path(0)).unwrap();
        assert_eq!(current.offsets().unwrap(), vec![0]);
    }

    #[test]
    fn test_observers_see_both_edges() {
        #[derive(Default)]
        struct Edges {
            started: AtomicUsize,
            finished: AtomicUsize,
        }
        impl logdex_generations::RotationObserver for Edges {
            fn rotation_started(&self) {
                self.started.fetch_add(1, Ordering::SeqCst);
            }
            fn rotation_finished(&self) {
                self.finished.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dir = TempDir::new().unwrap();
        let set = GenerationSet::new(GenerationLayout::new(dir.path().join("app.log")), 1);
        let edges = Arc::new(Edges::default());
        let coordinator =
            RotationCoordinator::new(set.clone(), RotationObservers::new().with(edges.clone()));
        let mut live = live_generation(&set);

        coordinator.rotate(&mut live).unwrap();
        coordinator.rotate(&mut live).unwrap();

        assert_eq!(edges.started.load(Ordering::SeqCst), 2);
        assert_eq!(edges.finished.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rotation_without_backups_truncates() {
        let dir = TempDir::new().unwrap();
        let set = GenerationSet::new(GenerationLayout::new(dir.path().join("app.log")), 0);
        let coordinator = RotationCoordinator::new(set.clone(), RotationObservers::new());
        let mut live = live_generation(&set);

        write(&mut live, "gone\n");
        coordinator.rotate(&mut live).unwrap();

        assert_eq!(set.present().unwrap(), vec![0]);
        assert_eq!(std::fs::metadata(set.layout().log_path(0)).unwrap().len(), 0);
        assert_eq!(IndexSnapshot::open(set.layout().index_path(0)).unwrap().num_entries(), 0);
        assert!(!set.layout().log_path(1).exists());
    }

    #[test]
    fn test_failed_shift_leaves_live_writable() {
        let dir = TempDir::new().unwrap();
        let set = GenerationSet::new(GenerationLayout::new(dir.path().join("app.log")), 1);
        let coordinator = RotationCoordinator::new(set.clone(), RotationObservers::new());
        let mut live = live_generation(&set);
        write(&mut live, "kept\n");

        // A non-empty directory at generation 1's log path is invisible to
        // delete() but makes the rename of generation 0 fail.
        std::fs::create_dir_all(set.layout().log_path(1)).unwrap();
        std::fs::write(set.layout().log_path(1).join("x"), b"x").unwrap();

        assert!(coordinator.rotate(&mut live).is_err());
        assert_eq!(coordinator.rotations(), 0);

        write(&mut live, "after\n");
        assert_eq!(std::fs::read(set.layout().log_path(0)).unwrap(), b"kept\nafter\n");
    }

    /// Writes into memory; the first `close` drops the handle and fails.
    struct SyncFailingSink {
        written: Vec<u8>,
        open: bool,
        close_failed: Arc<AtomicBool>,
    }

    impl LogSink for SyncFailingSink {
        fn current_length(&self) -> u64 {
            self.written.len() as u64
        }

        fn write_record(&mut self, bytes: &[u8]) -> std::io::Result<()> {
            if !self.open {
                return Err(std::io::Error::other("closed"));
            }
            self.written.extend_from_slice(bytes);
            Ok(())
        }

        fn should_roll(&self) -> bool {
            false
        }

        fn close(&mut self) -> std::io::Result<()> {
            self.open = false;
            if self.close_failed.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err(std::io::Error::other("sync failed"))
            }
        }

        fn reopen(&mut self) -> std::io::Result<()> {
            self.open = true;
            Ok(())
        }
    }

    #[test]
    fn test_failed_log_close_leaves_live_writable() {
        let dir = TempDir::new().unwrap();
        let set = GenerationSet::new(GenerationLayout::new(dir.path().join("app.log")), 1);
        set.ensure_live().unwrap();
        let coordinator = RotationCoordinator::new(set.clone(), RotationObservers::new());
        let index_path = set.layout().index_path(0);
        let index = OffsetIndex::open_with_recovery(&index_path, Analyzer::Whitespace).unwrap();
        let close_failed = Arc::new(AtomicBool::new(false));
        let sink = SyncFailingSink {
            written: Vec::new(),
            open: true,
            close_failed: close_failed.clone(),
        };
        let mut live = LiveGeneration::new(Box::new(sink), Some(index), index_path, Analyzer::Whitespace);
        write(&mut live, "kept\n");

        assert!(coordinator.rotate(&mut live).is_err());
        assert!(close_failed.load(Ordering::SeqCst));
        assert_eq!(coordinator.rotations(), 0);
        assert!(!set.layout().index_path(1).exists());

        write(&mut live, "after\n");
        live.commit().unwrap();
        let current = IndexSnapshot::open(set.layout().index_path(0)).unwrap();
        assert_eq!(current.offsets().unwrap(), vec![0, 5]);
    }
}
