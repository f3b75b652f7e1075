// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Search configuration.

use std::path::PathBuf;

use logdex_index::Analyzer;
use serde::{Deserialize, Serialize};

use crate::charset::Charset;

/// Where to find the generations and how to read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Path of the live log file the generations are named after.
    pub log_path: PathBuf,
    /// Highest generation number scanned.
    pub max_backup_index: u32,
    /// Decoding of the byte ranges.
    pub charset: Charset,
    /// Analyzer used to validate expressions before scanning.
    pub analyzer: Analyzer,
}

impl SearchConfig {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Self::default()
        }
    }

    pub fn with_max_backup_index(mut self, max_backup_index: u32) -> Self {
        self.max_backup_index = max_backup_index;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("logs/app.log"),
            max_backup_index: 1,
            charset: Charset::Utf8,
            analyzer: Analyzer::Whitespace,
        }
    }
}
