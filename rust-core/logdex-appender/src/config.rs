// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Appender configuration.
//!
//! Defaults follow the rolling file appender this replaces:
//! - flush_interval_millis: 5000
//! - max_backup_index: 1
//! - max_file_size: 10 MiB
//! - analyzer: whitespace
//! - append: true

use std::path::PathBuf;
use std::time::Duration;

use logdex_index::Analyzer;
use serde::{Deserialize, Serialize};

use crate::error::{AppendError, AppendResult};

/// Default period of the background committer.
pub const DEFAULT_FLUSH_INTERVAL_MILLIS: u64 = 5000;

/// Default rollover size of the live log file.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Configuration for an [`IndexedAppender`](crate::IndexedAppender).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppenderConfig {
    /// Path of the live log file; frozen generations and index directories
    /// are named after it.
    pub log_path: PathBuf,
    /// Period of the background committer, in milliseconds.
    pub flush_interval_millis: u64,
    /// Number of frozen generations kept. 0 truncates on rollover.
    pub max_backup_index: u32,
    /// Live file size that triggers a rollover after a write.
    pub max_file_size: u64,
    /// Tokenization for message and custom fields of new indexes.
    pub analyzer: Analyzer,
    /// Keep an existing live file (and its index) instead of truncating.
    pub append: bool,
}

impl AppenderConfig {
    /// Defaults with the given live log path.
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Self::default()
        }
    }

    pub fn with_flush_interval_millis(mut self, millis: u64) -> Self {
        self.flush_interval_millis = millis;
        self
    }

    pub fn with_max_backup_index(mut self, max_backup_index: u32) -> Self {
        self.max_backup_index = max_backup_index;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// The committer period.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_millis)
    }

    /// Reject values the coordinators cannot work with.
    pub fn validate(&self) -> AppendResult<()> {
        if self.log_path.as_os_str().is_empty() {
            return Err(AppendError::InvalidConfig("log_path is empty".to_string()));
        }
        if self.flush_interval_millis == 0 {
            return Err(AppendError::InvalidConfig(
                "flush_interval_millis must be positive".to_string(),
            ));
        }
        if self.max_file_size == 0 {
            return Err(AppendError::InvalidConfig(
                "max_file_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("logs/app.log"),
            flush_interval_millis: DEFAULT_FLUSH_INTERVAL_MILLIS,
            max_backup_index: 1,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            analyzer: Analyzer::Whitespace,
            append: true,
        }
    }
}
