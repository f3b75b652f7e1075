// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Generations - On-disk naming
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generation 0 is the live log file and its index directory; frozen
// generations carry a numeric suffix:
//
//   <base>       <base>_idx        -- generation 0 (live)
//   <base>.1     <base>_idx.1      -- most recently frozen
//   <base>.N     <base>_idx.N      -- oldest kept

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the log base name to form the index directory name.
pub const INDEX_SUFFIX: &str = "_idx";

/// Maps generation numbers to log file and index directory paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationLayout {
    base: PathBuf,
}

impl GenerationLayout {
    /// Layout for the log file at `base` (generation 0's log path).
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Layout for `log_file` inside `log_dir`.
    pub fn in_dir(log_dir: impl AsRef<Path>, log_file: impl AsRef<Path>) -> Self {
        Self::new(log_dir.as_ref().join(log_file))
    }

    /// The live log file path.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Log file path of generation `g`.
    pub fn log_path(&self, generation: u32) -> PathBuf {
        with_generation(self.base.as_os_str().to_owned(), generation)
    }

    /// Index directory path of generation `g`.
    pub fn index_path(&self, generation: u32) -> PathBuf {
        let mut name = self.base.as_os_str().to_owned();
        name.push(INDEX_SUFFIX);
        with_generation(name, generation)
    }
}

fn with_generation(mut name: OsString, generation: u32) -> PathBuf {
    if generation > 0 {
        name.push(format!(".{generation}"));
    }
    PathBuf::from(name)
}
