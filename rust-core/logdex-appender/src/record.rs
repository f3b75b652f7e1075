// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Log records and the hooks that decide what about them is searchable.

use std::borrow::Cow;
use std::collections::BTreeMap;

use logdex_index::IndexFields;

/// A rendered log record handed to the appender.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    /// Identifier from the calling context (session, request, thread).
    pub context_id: Option<String>,
    /// Additional calling-context values.
    pub context: BTreeMap<String, String>,
    /// The exact bytes written to the log file.
    pub body: Vec<u8>,
}

impl LogRecord {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_context_id(mut self, id: impl Into<String>) -> Self {
        self.context_id = Some(id.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The context identifier, or the calling thread's name.
    pub fn record_id(&self) -> String {
        match &self.context_id {
            Some(id) => id.clone(),
            None => std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
        }
    }
}

/// Decides which fields of a record become searchable.
///
/// Called with the offset the record will start at, before it is written.
pub trait FieldHook: Send + Sync {
    fn fields(&self, offset: u64, record: &LogRecord) -> IndexFields;
}

impl<F> FieldHook for F
where
    F: Fn(u64, &LogRecord) -> IndexFields + Send + Sync,
{
    fn fields(&self, offset: u64, record: &LogRecord) -> IndexFields {
        self(offset, record)
    }
}

/// Indexes the record identifier only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFieldHook;

impl FieldHook for DefaultFieldHook {
    fn fields(&self, _offset: u64, record: &LogRecord) -> IndexFields {
        IndexFields::new(record.record_id())
    }
}

/// Indexes the record identifier, the message text and every context value.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFieldHook;

impl FieldHook for MessageFieldHook {
    fn fields(&self, _offset: u64, record: &LogRecord) -> IndexFields {
        let mut fields = IndexFields::new(record.record_id())
            .with_message(record.body_text().trim_end().to_string());
        fields.fields = record.context.clone();
        fields
    }
}
