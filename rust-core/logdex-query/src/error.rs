// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Query - Error types
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::PathBuf;

use logdex_generations::GenerationError;
use logdex_index::IndexError;
use thiserror::Error;

use crate::hit::RangeHit;

/// Errors returned by the range query engine.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The expression could not be parsed. Nothing was scanned.
    #[error("Query syntax error in {expression:?}: {reason}")]
    Syntax {
        /// The offending expression.
        expression: String,
        /// Parser message.
        reason: String,
    },

    /// Generations were renumbered while the scan was running. `partial`
    /// holds the hits of the generations completed before `generation`;
    /// rerun the whole query for a trustworthy result.
    #[error("Log rolled over while scanning generation {generation} ({} partial hits)", .partial.len())]
    StaleScan {
        /// The generation being read when the rotation was observed.
        generation: u32,
        /// Hits collected from earlier generations.
        partial: Vec<RangeHit>,
    },

    /// Reading a generation's log file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The log file.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// Opening or searching an index failed.
    #[error(transparent)]
    Index(IndexError),

    /// Inspecting generations on disk failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<IndexError> for QueryError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::QuerySyntax { expression, reason } => Self::Syntax { expression, reason },
            other => Self::Index(other),
        }
    }
}

impl QueryError {
    /// Whether rerunning the same query may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StaleScan { .. })
    }
}

/// Convenience type alias for query results.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_errors_are_lifted() {
        let err: QueryError = IndexError::QuerySyntax {
            expression: "record_id:(".to_string(),
            reason: "unbalanced".to_string(),
        }
        .into();
        assert!(matches!(err, QueryError::Syntax { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_stale_scan_display() {
        let err = QueryError::StaleScan {
            generation: 1,
            partial: Vec::new(),
        };
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Log rolled over while scanning generation 1 (0 partial hits)"
        );
    }
}
