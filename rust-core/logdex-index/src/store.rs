// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Offset Index - Writable index handle
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `OffsetIndex` owns the Tantivy writer for one generation's index
// directory. Appends are buffered in memory and become visible to readers
// opening the same directory only after `commit()`. `close()` commits and
// releases the writer lock.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tantivy::schema::OwnedValue;
use tantivy::{Index, IndexWriter, TantivyDocument, Term};
use tracing::{debug, info, warn};

use crate::entry::IndexEntry;
use crate::error::{IndexError, IndexResult};
use crate::schema::{register_tokenizers, Analyzer, IndexSchema};

/// Heap budget handed to the single indexing thread.
pub const WRITER_MEMORY_BUDGET: usize = 20_000_000;

/// File Tantivy writes when an index is initialised.
pub const META_FILE: &str = "meta.json";

/// Marker file guarding the exclusive writer. Tantivy holds an OS lock on
/// it for as long as the writer lives.
pub const WRITER_LOCK_FILE: &str = ".tantivy-writer.lock";

/// Pause before the single retry of a held writer lock.
pub const LOCK_RETRY_DELAY: Duration = Duration::from_millis(50);

/// How `OffsetIndex::open` treats the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open the existing index, or create one if the directory holds none.
    OpenOrCreate,
    /// Discard whatever the directory holds and create an empty index.
    Recreate,
}

/// Returns `true` if `path` holds an initialised index.
pub fn index_exists(path: &Path) -> bool {
    path.join(META_FILE).is_file()
}


/// A writable handle on one generation's offset index.
pub struct OffsetIndex {
    path: PathBuf,
    index: Index,
    schema: IndexSchema,
    writer: Option<IndexWriter>,
    /// Appends and retractions buffered since the last commit.
    pending: u64,
}

impl OffsetIndex {
    /// Open or create the index at `path`.
    ///
    /// Fails with [`IndexError::CorruptIndex`] when existing storage cannot
    /// be read and with [`IndexError::LockHeld`] when another writer owns it.
    pub fn open(path: impl AsRef<Path>, analyzer: Analyzer, mode: OpenMode) -> IndexResult<Self> {
        let path = path.as_ref().to_path_buf();

        if mode == OpenMode::Recreate && path.exists() {
            fs::remove_dir_all(&path)?;
            warn!(path = %path.display(), "Discarded existing offset index");
        }
        fs::create_dir_all(&path)?;

        let index = if index_exists(&path) {
            Index::open_in_dir(&path).map_err(|e| IndexError::from_tantivy(&path, e))?
        } else {
            let schema = IndexSchema::build(analyzer);
            let index = Index::create_in_dir(&path, schema.schema.clone())
                .map_err(|e| IndexError::from_tantivy(&path, e))?;
            info!(path = %path.display(), %analyzer, "Created offset index");
            index
        };
        register_tokenizers(&index);

        let schema =
            IndexSchema::from_schema(index.schema()).map_err(|e| IndexError::from_tantivy(&path, e))?;
        let writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_MEMORY_BUDGET)
            .map_err(|e| IndexError::from_tantivy(&path, e))?;

        debug!(path = %path.display(), "Opened offset index for writing");

        Ok(Self {
            path,
            index,
            schema,
            writer: Some(writer),
            pending: 0,
        })
    }

    /// Open `path`, applying the recovery policy for the two local causes:
    /// a corrupt index is re-created (its entries are lost) and a held lock
    /// is retried once after [`LOCK_RETRY_DELAY`]. The lock file is never
    /// removed; a lock still held on retry belongs to a live writer and is
    /// reported as `LockHeld`.
    pub fn open_with_recovery(path: impl AsRef<Path>, analyzer: Analyzer) -> IndexResult<Self> {
        let path = path.as_ref();
        match Self::open(path, analyzer, OpenMode::OpenOrCreate) {
            Ok(index) => Ok(index),
            Err(err) if err.is_corrupt() => {
                warn!(path = %path.display(), error = %err, "Offset index unreadable, re-creating");
                Self::open(path, analyzer, OpenMode::Recreate)
            }
            Err(err) if err.is_lock_held() => {
                warn!(path = %path.display(), "Offset index lock held, retrying once");
                std::thread::sleep(LOCK_RETRY_DELAY);
                Self::open(path, analyzer, OpenMode::OpenOrCreate)
            }
            Err(err) => Err(err),
        }
    }

    /// Insert one entry. No ordering validation is done here.
    pub fn append(&mut self, entry: &IndexEntry) -> IndexResult<()> {
        let writer = self
            .writer
            .as_ref()
            .ok_or_else(|| IndexError::Closed(self.path.clone()))?;

        let mut doc = TantivyDocument::default();
        doc.add_text(self.schema.record_id, &entry.record_id);
        doc.add_u64(self.schema.offset, entry.offset);
        doc.add_u64(self.schema.timestamp, entry.timestamp_millis);
        if let Some(message) = &entry.message {
            doc.add_text(self.schema.message, message);
        }
        if !entry.fields.is_empty() {
            let object: BTreeMap<String, OwnedValue> = entry
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), OwnedValue::Str(v.clone())))
                .collect();
            doc.add_object(self.schema.fields, object);
            doc.add_text(self.schema.fields_stored, serde_json::to_string(&entry.fields)?);
        }

        writer
            .add_document(doc)
            .map_err(|e| IndexError::from_tantivy(&self.path, e))?;
        self.pending += 1;
        Ok(())
    }

    /// Remove the entry recorded at `offset`, committed or not.
    ///
    /// Used when the record an entry describes never reached the log file.
    pub fn retract(&mut self, offset: u64) -> IndexResult<()> {
        let writer = self
            .writer
            .as_ref()
            .ok_or_else(|| IndexError::Closed(self.path.clone()))?;
        writer.delete_term(Term::from_field_u64(self.schema.offset, offset));
        self.pending += 1;
        Ok(())
    }

    /// Make buffered entries visible to independent readers.
    ///
    /// Returns the number of entries the commit published.
    pub fn commit(&mut self) -> IndexResult<u64> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| IndexError::Closed(self.path.clone()))?;

        if self.pending == 0 {
            return Ok(0);
        }

        writer
            .commit()
            .map_err(|e| IndexError::from_tantivy(&self.path, e))?;
        let published = std::mem::take(&mut self.pending);
        debug!(path = %self.path.display(), published, "Committed offset index");
        Ok(published)
    }

    /// Commit pending entries and release the writer lock.
    pub fn close(mut self) -> IndexResult<()> {
        self.shutdown()
    }

    /// Number of buffered operations not yet committed.
    pub fn pending(&self) -> u64 {
        self.pending
    }

    /// The index directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying Tantivy index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    fn shutdown(&mut self) -> IndexResult<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        if self.pending > 0 {
            writer
                .commit()
                .map_err(|e| IndexError::from_tantivy(&self.path, e))?;
            self.pending = 0;
        }
        writer
            .wait_merging_threads()
            .map_err(|e| IndexError::from_tantivy(&self.path, e))?;
        debug!(path = %self.path.display(), "Closed offset index");
        Ok(())
    }
}

impl Drop for OffsetIndex {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(path = %self.path.display(), error = %e, "Failed to close offset index on drop");
        }
    }
}

impl std::fmt::Debug for OffsetIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffsetIndex")
            .field("path", &self.path)
            .field("open", &self.writer.is_some())
            .field("pending", &self.pending)
            .finish()
    }
}
