// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Generations - Generation set
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tracks which generations 0..=max_backup_index exist on disk and performs
// the per-generation operations rotation is built from. Every operation
// moves a log file and its index directory together; a generation whose
// shift fails halfway is moved back so the pair stays under one number.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::{GenerationError, GenerationResult};
use crate::layout::GenerationLayout;

/// On-disk state of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInfo {
    /// Generation number (0 = live).
    pub generation: u32,
    /// Log file path.
    pub log_path: PathBuf,
    /// Index directory path.
    pub index_path: PathBuf,
    /// Log file size in bytes, if the file exists.
    pub log_size: Option<u64>,
    /// Whether the index directory exists.
    pub index_exists: bool,
}

impl GenerationInfo {
    /// Both the log file and the index directory exist.
    pub fn is_complete(&self) -> bool {
        self.log_size.is_some() && self.index_exists
    }

    /// Neither artifact exists.
    pub fn is_absent(&self) -> bool {
        self.log_size.is_none() && !self.index_exists
    }
}

/// The generations of one rotating log file.
#[derive(Debug, Clone)]
pub struct GenerationSet {
    layout: GenerationLayout,
    max_backup_index: u32,
}

impl GenerationSet {
    /// A set keeping generations `0..=max_backup_index`.
    pub fn new(layout: GenerationLayout, max_backup_index: u32) -> Self {
        Self {
            layout,
            max_backup_index,
        }
    }

    /// The naming scheme.
    pub fn layout(&self) -> &GenerationLayout {
        &self.layout
    }

    /// The oldest generation number kept.
    pub fn max_backup_index(&self) -> u32 {
        self.max_backup_index
    }

    /// Inspect generation `g`.
    pub fn info(&self, generation: u32) -> GenerationResult<GenerationInfo> {
        let log_path = self.layout.log_path(generation);
        let index_path = self.layout.index_path(generation);
        let log_size = match fs::metadata(&log_path) {
            Ok(meta) if meta.is_file() => Some(meta.len()),
            Ok(_) => None,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(GenerationError::Io(e)),
        };
        let index_exists = index_path.is_dir();

        Ok(GenerationInfo {
            generation,
            log_path,
            index_path,
            log_size,
            index_exists,
        })
    }

    /// Inspect every generation in `0..=max_backup_index`.
    pub fn list(&self) -> GenerationResult<Vec<GenerationInfo>> {
        (0..=self.max_backup_index).map(|g| self.info(g)).collect()
    }

    /// Generations whose log file and index both exist, ascending.
    pub fn present(&self) -> GenerationResult<Vec<u32>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(GenerationInfo::is_complete)
            .map(|info| info.generation)
            .collect())
    }

    /// Permanently remove generation `g`'s log file and index directory.
    ///
    /// Returns `true` if anything was removed.
    pub fn delete(&self, generation: u32) -> GenerationResult<bool> {
        let info = self.info(generation)?;
        if info.is_absent() {
            return Ok(false);
        }
        if info.log_size.is_some() {
            fs::remove_file(&info.log_path)?;
        }
        if info.index_exists {
            fs::remove_dir_all(&info.index_path)?;
        }
        debug!(generation, log = %info.log_path.display(), "Deleted generation");
        Ok(true)
    }

    /// Rename generation `g` to `g + 1`.
    ///
    /// Refuses to overwrite an existing `g + 1`. Returns `false` when `g`
    /// does not exist. If the index rename fails after the log file moved,
    /// the log file is moved back before the error is returned.
    pub fn shift(&self, generation: u32) -> GenerationResult<bool> {
        let target = generation + 1;
        if target > self.max_backup_index {
            return Err(GenerationError::OutOfRange {
                generation: target,
                max_backup_index: self.max_backup_index,
            });
        }

        let source = self.info(generation)?;
        if source.is_absent() {
            return Ok(false);
        }
        let dest = self.info(target)?;
        if dest.log_size.is_some() {
            return Err(GenerationError::Occupied {
                generation: target,
                path: dest.log_path,
            });
        }
        if dest.index_exists {
            return Err(GenerationError::Occupied {
                generation: target,
                path: dest.index_path,
            });
        }

        let log_moved = if source.log_size.is_some() {
            rename(&source.log_path, &dest.log_path)?;
            true
        } else {
            false
        };

        if source.index_exists {
            if let Err(err) = rename(&source.index_path, &dest.index_path) {
                if log_moved {
                    if let Err(undo) = fs::rename(&dest.log_path, &source.log_path) {
                        error!(
                            generation,
                            error = %undo,
                            "Failed to move log file back after index rename failure"
                        );
                    }
                }
                return Err(err);
            }
        }

        debug!(from = generation, to = target, "Shifted generation");
        Ok(true)
    }

    /// Make room for a newly frozen generation: delete the oldest kept
    /// generation, then rename `max-1, ..., 1` to `max, ..., 2`.
    ///
    /// Generation 0 is left in place. A no-op when `max_backup_index == 0`.
    pub fn shift_frozen(&self) -> GenerationResult<()> {
        if self.max_backup_index == 0 {
            return Ok(());
        }
        self.delete(self.max_backup_index)?;
        for generation in (1..self.max_backup_index).rev() {
            self.shift(generation)?;
        }
        Ok(())
    }

    /// Create an empty generation 0: a zero-length log file and an empty
    /// index directory. Both paths must be free.
    pub fn create_fresh(&self) -> GenerationResult<()> {
        let live = self.info(0)?;
        if live.log_size.is_some() {
            return Err(GenerationError::Occupied {
                generation: 0,
                path: live.log_path,
            });
        }
        if live.index_exists {
            return Err(GenerationError::Occupied {
                generation: 0,
                path: live.index_path,
            });
        }
        ensure_parent(&live.log_path)?;
        File::create(&live.log_path)?;
        fs::create_dir_all(&live.index_path)?;
        debug!(log = %live.log_path.display(), "Created fresh live generation");
        Ok(())
    }

    /// Create whichever generation 0 artifacts are missing, keeping any that
    /// exist. Used at startup.
    pub fn ensure_live(&self) -> GenerationResult<()> {
        let live = self.info(0)?;
        ensure_parent(&live.log_path)?;
        if live.log_size.is_none() {
            File::create(&live.log_path)?;
        }
        if !live.index_exists {
            fs::create_dir_all(&live.index_path)?;
        }
        Ok(())
    }

    /// Truncate the live log file and empty its index directory in place.
    /// This is rotation when no backups are kept.
    pub fn reset_live(&self) -> GenerationResult<()> {
        let live = self.info(0)?;
        if live.index_exists {
            fs::remove_dir_all(&live.index_path)?;
        }
        if live.log_size.is_some() {
            fs::remove_file(&live.log_path)?;
        }
        self.create_fresh()
    }

    /// Rotate every generation, assuming nothing holds generation 0 open:
    /// shift the frozen generations, freeze generation 0 as generation 1 and
    /// create a fresh generation 0. With no backups the live generation is
    /// reset instead.
    pub fn rotate(&self) -> GenerationResult<()> {
        if self.max_backup_index == 0 {
            self.reset_live()?;
        } else {
            self.shift_frozen()?;
            self.shift(0)?;
            self.create_fresh()?;
        }
        info!(
            base = %self.layout.base().display(),
            max_backup_index = self.max_backup_index,
            "Rotated generations"
        );
        Ok(())
    }
}

fn rename(from: &Path, to: &Path) -> GenerationResult<()> {
    fs::rename(from, to).map_err(|source| GenerationError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn ensure_parent(path: &Path) -> GenerationResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper to build a set with generations written to a temp directory.
    struct TestDir {
        _inner: TempDir,
        set: GenerationSet,
    }

    impl TestDir {
        fn new(max_backup_index: u32) -> Self {
            let inner = TempDir::new().unwrap();
            let layout = GenerationLayout::new(inner.path().join("app.log"));
            Self {
                _inner: inner,
                set: GenerationSet::new(layout, max_backup_index),
            }
        }

        /// Write a generation whose log holds `content` and whose index dir
        /// holds a marker file with the same content.
        fn create_generation(&self, generation: u32, content: &str) {
            let layout = self.set.layout();
            let mut file = File::create(layout.log_path(generation)).unwrap();
            file.write_all(content.as_bytes()).unwrap();
            let index = layout.index_path(generation);
            fs::create_dir_all(&index).unwrap();
            fs::write(index.join("marker"), content).unwrap();
        }

        fn log_content(&self, generation: u32) -> String {
            fs::read_to_string(self.set.layout().log_path(generation)).unwrap()
        }

        fn index_marker(&self, generation: u32) -> String {
            fs::read_to_string(self.set.layout().index_path(generation).join("marker")).unwrap()
        }
    }

    #[test]
    fn test_info_reports_artifacts() {
        let dir = TestDir::new(3);
        dir.create_generation(1, "hello");

        let info = dir.set.info(1).unwrap();
        assert!(info.is_complete());
        assert_eq!(info.log_size, Some(5));

        assert!(dir.set.info(2).unwrap().is_absent());
    }

    #[test]
    fn test_present_lists_complete_generations_only() {
        let dir = TestDir::new(3);
        dir.create_generation(0, "live");
        dir.create_generation(2, "old");
        File::create(dir.set.layout().log_path(3)).unwrap();

        assert_eq!(dir.set.present().unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_delete_removes_both_artifacts() {
        let dir = TestDir::new(2);
        dir.create_generation(2, "doomed");

        assert!(dir.set.delete(2).unwrap());
        assert!(dir.set.info(2).unwrap().is_absent());
        assert!(!dir.set.delete(2).unwrap());
    }

    #[test]
    fn test_shift_moves_pair_together() {
        let dir = TestDir::new(3);
        dir.create_generation(1, "one");

        assert!(dir.set.shift(1).unwrap());
        assert!(dir.set.info(1).unwrap().is_absent());
        assert_eq!(dir.log_content(2), "one");
        assert_eq!(dir.index_marker(2), "one");
    }

    #[test]
    fn test_shift_refuses_to_overwrite() {
        let dir = TestDir::new(3);
        dir.create_generation(1, "one");
        dir.create_generation(2, "two");

        let result = dir.set.shift(1);
        assert!(matches!(result, Err(GenerationError::Occupied { generation: 2, .. })));
        assert_eq!(dir.log_content(1), "one");
        assert_eq!(dir.log_content(2), "two");
    }

    #[test]
    fn test_shift_past_max_is_out_of_range() {
        let dir = TestDir::new(1);
        dir.create_generation(1, "one");
        assert!(matches!(
            dir.set.shift(1),
            Err(GenerationError::OutOfRange { generation: 2, .. })
        ));
    }

    #[test]
    fn test_shift_absent_generation_is_noop() {
        let dir = TestDir::new(2);
        assert!(!dir.set.shift(1).unwrap());
    }

    #[test]
    fn test_shift_frozen_deletes_oldest_and_renames_upward() {
        let dir = TestDir::new(3);
        dir.create_generation(0, "live");
        dir.create_generation(1, "one");
        dir.create_generation(2, "two");
        dir.create_generation(3, "three");

        dir.set.shift_frozen().unwrap();

        assert_eq!(dir.log_content(0), "live");
        assert!(dir.set.info(1).unwrap().is_absent());
        assert_eq!(dir.log_content(2), "one");
        assert_eq!(dir.log_content(3), "two");
        assert_eq!(dir.index_marker(3), "two");
    }

    #[test]
    fn test_rotate_keeps_k_plus_one_generations() {
        let dir = TestDir::new(2);
        dir.create_generation(0, "c");
        dir.create_generation(1, "b");
        dir.create_generation(2, "a");

        dir.set.rotate().unwrap();

        assert_eq!(dir.set.present().unwrap(), vec![0, 1, 2]);
        assert_eq!(dir.log_content(0), "");
        assert_eq!(dir.log_content(1), "c");
        assert_eq!(dir.log_content(2), "b");
        assert!(!dir.set.layout().log_path(3).exists());
    }

    #[test]
    fn test_rotate_without_backups_resets_live() {
        let dir = TestDir::new(0);
        dir.create_generation(0, "live data");

        dir.set.rotate().unwrap();

        let info = dir.set.info(0).unwrap();
        assert_eq!(info.log_size, Some(0));
        assert!(info.index_exists);
        assert!(!info.index_path.join("marker").exists());
        assert!(!dir.set.layout().log_path(1).exists());
    }

    #[test]
    fn test_create_fresh_refuses_existing_live() {
        let dir = TestDir::new(1);
        dir.create_generation(0, "live");
        assert!(matches!(
            dir.set.create_fresh(),
            Err(GenerationError::Occupied { generation: 0, .. })
        ));
    }

    #[test]
    fn test_ensure_live_keeps_existing_content() {
        let dir = TestDir::new(1);
        fs::write(dir.set.layout().log_path(0), "kept").unwrap();

        dir.set.ensure_live().unwrap();

        assert_eq!(dir.log_content(0), "kept");
        assert!(dir.set.info(0).unwrap().index_exists);
    }
}
