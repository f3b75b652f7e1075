// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Appender - Live log file writer
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The sink owns the live log file and the byte counter every offset is
// taken from. The write coordinator reads `current_length()` and then calls
// `write_record()` under the same lock, so the counter it records is exactly
// the position the write lands at.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// The physical log writer.
pub trait LogSink: Send {
    /// Authoritative byte length of the live file.
    fn current_length(&self) -> u64;

    /// Append a record's bytes and advance the length.
    fn write_record(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Whether the rollover condition has been reached.
    fn should_roll(&self) -> bool;

    /// Flush and release the file so it can be renamed.
    fn close(&mut self) -> std::io::Result<()>;

    /// Open the live path again, appending to whatever it holds.
    fn reopen(&mut self) -> std::io::Result<()>;
}

/// A size-bounded, append-only log file with an exact byte counter.
#[derive(Debug)]
pub struct RollingLogFile {
    path: PathBuf,
    file: Option<File>,
    length: u64,
    max_file_size: u64,
}

impl RollingLogFile {
    /// Open `path` for appending, creating it if absent.
    pub fn open(path: impl AsRef<Path>, max_file_size: u64) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (file, length) = open_append(&path)?;
        debug!(path = %path.display(), length, "Opened live log file");
        Ok(Self {
            path,
            file: Some(file),
            length,
            max_file_size,
        })
    }

    /// The live file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is currently open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl LogSink for RollingLogFile {
    fn current_length(&self) -> u64 {
        self.length
    }

    fn write_record(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| std::io::Error::other("live log file is closed"))?;

        if let Err(err) = file.write_all(bytes) {
            // A partial write moved the end of file; resynchronise the
            // counter so the next offset is still exact.
            match file.metadata() {
                Ok(meta) => self.length = meta.len(),
                Err(e) => warn!(path = %self.path.display(), error = %e, "Cannot resync log length"),
            }
            return Err(err);
        }
        self.length += bytes.len() as u64;
        Ok(())
    }

    fn should_roll(&self) -> bool {
        self.length >= self.max_file_size
    }

    fn close(&mut self) -> std::io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        Ok(())
    }

    fn reopen(&mut self) -> std::io::Result<()> {
        self.close()?;
        let (file, length) = open_append(&self.path)?;
        self.file = Some(file);
        self.length = length;
        Ok(())
    }
}

fn open_append(path: &Path) -> std::io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let length = file.metadata()?.len();
    Ok((file, length))
}
