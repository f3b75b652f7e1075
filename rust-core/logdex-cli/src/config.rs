// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! TOML configuration with command line overrides.
//!
//! ```toml
//! [appender]
//! log_path = "/var/log/app/app.log"
//! max_backup_index = 3
//! flush_interval_millis = 5000
//!
//! [search]
//! log_path = "/var/log/app/app.log"
//! max_backup_index = 3
//! charset = "utf-8"
//! ```
//!
//! A `log_path` or `max_backup_index` given only in one section is copied
//! to the other, so a single section is usually enough.

use std::path::Path;

use anyhow::Context;
use logdex_appender::AppenderConfig;
use logdex_query::SearchConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::args::{IngestArgs, LocationArgs, SearchArgs};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub appender: AppenderConfig,
    pub search: SearchConfig,
}

/// Which sections the file actually set.
#[derive(Debug, Deserialize)]
struct Present {
    appender: Option<toml::Table>,
    search: Option<toml::Table>,
}

impl CliConfig {
    /// Read `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        let present: Present = toml::from_str(text)?;
        config.share_location(&present);
        Ok(config)
    }

    fn share_location(&mut self, present: &Present) {
        let set = |table: &Option<toml::Table>, key: &str| {
            table.as_ref().is_some_and(|t| t.contains_key(key))
        };
        for key in ["log_path", "max_backup_index"] {
            let in_appender = set(&present.appender, key);
            let in_search = set(&present.search, key);
            match (in_appender, in_search) {
                (true, false) => self.copy_to_search(key),
                (false, true) => self.copy_to_appender(key),
                _ => {}
            }
        }
    }

    fn copy_to_search(&mut self, key: &str) {
        match key {
            "log_path" => self.search.log_path = self.appender.log_path.clone(),
            _ => self.search.max_backup_index = self.appender.max_backup_index,
        }
    }

    fn copy_to_appender(&mut self, key: &str) {
        match key {
            "log_path" => self.appender.log_path = self.search.log_path.clone(),
            _ => self.appender.max_backup_index = self.search.max_backup_index,
        }
    }

    fn apply_location(&mut self, location: &LocationArgs) {
        if let Some(log) = &location.log {
            self.appender.log_path = log.clone();
            self.search.log_path = log.clone();
        }
        if let Some(max) = location.max_backup_index {
            self.appender.max_backup_index = max;
            self.search.max_backup_index = max;
        }
    }

    /// The search section with flags applied.
    pub fn search_config(mut self, args: &SearchArgs) -> SearchConfig {
        self.apply_location(&args.location);
        if let Some(charset) = args.charset {
            self.search.charset = charset;
        }
        self.search
    }

    /// The appender section with flags applied.
    pub fn appender_config(mut self, args: &IngestArgs) -> AppenderConfig {
        self.apply_location(&args.location);
        let mut config = self.appender;
        if let Some(size) = args.max_file_size {
            config.max_file_size = size;
        }
        if let Some(millis) = args.flush_interval_millis {
            config.flush_interval_millis = millis;
        }
        if let Some(analyzer) = args.analyzer {
            config.analyzer = analyzer;
        }
        if args.truncate {
            config.append = false;
        }
        config
    }

    /// Either section's location with flags applied.
    pub fn location_config(mut self, location: &LocationArgs) -> SearchConfig {
        self.apply_location(location);
        self.search
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdex_query::Charset;
    use std::path::PathBuf;

    #[test]
    fn test_single_section_is_shared() {
        let config = CliConfig::parse(
            r#"
            [appender]
            log_path = "/srv/app.log"
            max_backup_index = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.search.log_path, PathBuf::from("/srv/app.log"));
        assert_eq!(config.search.max_backup_index, 4);
    }

    #[test]
    fn test_sections_keep_their_own_values() {
        let config = CliConfig::parse(
            r#"
            [appender]
            max_backup_index = 4
            [search]
            max_backup_index = 2
            charset = "iso-8859-1"
            "#,
        )
        .unwrap();
        assert_eq!(config.appender.max_backup_index, 4);
        assert_eq!(config.search.max_backup_index, 2);
        assert_eq!(config.search.charset, Charset::Latin1);
    }

    #[test]
    fn test_flags_override_file() {
        let config = CliConfig::parse("[search]\nlog_path = \"/a.log\"\n").unwrap();
        let location = LocationArgs {
            log: Some(PathBuf::from("/b.log")),
            max_backup_index: Some(7),
        };
        let search = config.location_config(&location);
        assert_eq!(search.log_path, PathBuf::from("/b.log"));
        assert_eq!(search.max_backup_index, 7);
    }

    #[test]
    fn test_unknown_charset_is_rejected() {
        assert!(CliConfig::parse("[search]\ncharset = \"ebcdic\"\n").is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/logdex.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/logdex.toml"));
    }
}
