// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Offset Index - Entry types
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// An index entry describes one log record: where it starts in its
// generation's log file, when it was written, and what makes it findable.
// Entries are append-only; a generation's entries carry strictly
// increasing offsets.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Searchable metadata produced for a record by a field hook.
///
/// `offset` and `timestamp_millis` are not part of this type; the write
/// path assigns them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFields {
    /// Identifier the record is looked up by (session, thread, request...).
    pub record_id: String,
    /// Rendered message text, indexed but not stored.
    pub message: Option<String>,
    /// Caller-defined keyword fields, queried as `fields.<name>:<value>`.
    pub fields: BTreeMap<String, String>,
}

impl IndexFields {
    /// Fields carrying only a record identifier.
    pub fn new(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            ..Self::default()
        }
    }

    /// Make the rendered message searchable.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add a caller-defined keyword field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// One record's position and metadata within a single generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Identifier the record is looked up by.
    pub record_id: String,
    /// Byte position in the generation's log file where the record begins.
    pub offset: u64,
    /// Insertion time, Unix milliseconds UTC.
    pub timestamp_millis: u64,
    /// Rendered message text (indexed only; `None` when read back).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Caller-defined keyword fields.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl IndexEntry {
    /// Build an entry for a record beginning at `offset`, stamped now.
    pub fn new(offset: u64, fields: IndexFields) -> Self {
        Self::at(offset, now_millis(), fields)
    }

    /// Build an entry with an explicit timestamp.
    pub fn at(offset: u64, timestamp_millis: u64, fields: IndexFields) -> Self {
        Self {
            record_id: fields.record_id,
            offset,
            timestamp_millis,
            message: fields.message,
            fields: fields.fields,
        }
    }
}

/// Current wall-clock time in Unix milliseconds, clamped at zero.
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_takes_fields() {
        let fields = IndexFields::new("session-7")
            .with_message("payment accepted")
            .with_field("user", "alice");
        let entry = IndexEntry::at(120, 1_700_000_000_000, fields);

        assert_eq!(entry.record_id, "session-7");
        assert_eq!(entry.offset, 120);
        assert_eq!(entry.timestamp_millis, 1_700_000_000_000);
        assert_eq!(entry.message.as_deref(), Some("payment accepted"));
        assert_eq!(entry.fields.get("user").map(String::as_str), Some("alice"));
    }

    #[test]
    fn test_new_stamps_current_time() {
        let before = now_millis();
        let entry = IndexEntry::new(0, IndexFields::new("t"));
        assert!(entry.timestamp_millis >= before);
    }
}
