// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Offset Index - Error types
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Classifies Tantivy failures into the two locally recoverable causes
// (unreadable storage, held writer lock), query syntax errors, and
// everything else, which is surfaced to the caller unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening, writing or querying an offset index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index storage at `path` could not be read. Recoverable by
    /// re-creating the index (its entries are lost).
    #[error("Corrupt index at {path}: {reason}")]
    CorruptIndex {
        /// Index directory.
        path: PathBuf,
        /// What Tantivy reported.
        reason: String,
    },

    /// Another live writer holds the exclusive index lock.
    #[error("Index writer lock held at {path}")]
    LockHeld {
        /// Index directory.
        path: PathBuf,
    },

    /// The query expression could not be parsed.
    #[error("Query syntax error in {expression:?}: {reason}")]
    QuerySyntax {
        /// The offending expression.
        expression: String,
        /// Parser message.
        reason: String,
    },

    /// The index directory does not contain an index.
    #[error("No index found at {0}")]
    NotFound(PathBuf),

    /// The writer was already closed.
    #[error("Index handle for {0} is closed")]
    Closed(PathBuf),

    /// A stored document is missing a required field.
    #[error("Malformed index entry: missing field {0}")]
    MalformedEntry(&'static str),

    /// Any other Tantivy failure.
    #[error("Index error: {0}")]
    Tantivy(String),

    /// An I/O error outside of Tantivy (directory creation or removal).
    #[error("Index I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Custom fields could not be (de)serialised.
    #[error("Field encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IndexError {
    /// Classify a Tantivy error raised while working on the index at `path`.
    pub fn from_tantivy(path: impl Into<PathBuf>, err: tantivy::TantivyError) -> Self {
        use tantivy::TantivyError;

        let path = path.into();
        match err {
            TantivyError::LockFailure(..) => IndexError::LockHeld { path },
            TantivyError::DataCorruption(e) => IndexError::CorruptIndex {
                path,
                reason: format!("{e:?}"),
            },
            TantivyError::OpenReadError(e) => IndexError::CorruptIndex {
                path,
                reason: e.to_string(),
            },
            TantivyError::IncompatibleIndex(e) => IndexError::CorruptIndex {
                path,
                reason: format!("{e:?}"),
            },
            TantivyError::SchemaError(reason) => IndexError::CorruptIndex { path, reason },
            other => IndexError::Tantivy(other.to_string()),
        }
    }

    /// Returns `true` for failures the caller may recover from by
    /// re-creating the index.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, IndexError::CorruptIndex { .. })
    }

    /// Returns `true` when the writer lock was held by someone else.
    pub fn is_lock_held(&self) -> bool {
        matches!(self, IndexError::LockHeld { .. })
    }
}

/// Convenience type alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_failure_is_classified_as_lock_held() {
        let err = tantivy::TantivyError::LockFailure(
            tantivy::directory::error::LockError::LockBusy,
            None,
        );
        let classified = IndexError::from_tantivy("/tmp/app.log_idx", err);
        assert!(classified.is_lock_held());
        assert!(!classified.is_corrupt());
    }

    #[test]
    fn test_schema_error_is_classified_as_corrupt() {
        let err = tantivy::TantivyError::SchemaError("offset missing".to_string());
        let classified = IndexError::from_tantivy("/tmp/app.log_idx", err);
        assert!(classified.is_corrupt());
        assert!(classified.to_string().contains("offset missing"));
    }

    #[test]
    fn test_data_corruption_is_classified_as_corrupt() {
        let err = tantivy::TantivyError::DataCorruption(tantivy::error::DataCorruption::comment_only(
            "truncated segment",
        ));
        let classified = IndexError::from_tantivy("/tmp/app.log_idx", err);
        assert!(classified.is_corrupt());
        assert!(classified.to_string().contains("truncated segment"));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = tantivy::TantivyError::InvalidArgument("bad".to_string());
        let classified = IndexError::from_tantivy("/tmp/x", err);
        assert!(matches!(classified, IndexError::Tantivy(_)));
    }

    #[test]
    fn test_query_syntax_display() {
        let err = IndexError::QuerySyntax {
            expression: "record_id:(".to_string(),
            reason: "unbalanced".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("record_id:("));
        assert!(message.contains("unbalanced"));
    }
}
