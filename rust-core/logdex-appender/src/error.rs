// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Appender - Error types
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use logdex_generations::GenerationError;
use logdex_index::IndexError;
use thiserror::Error;

/// Errors surfaced by the write and rotation coordinators.
#[derive(Debug, Error)]
pub enum AppendError {
    /// Writing to the live log file failed. The record was not logged.
    #[error("Log write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The live offset index could not be opened or committed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Rearranging generations on disk failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The appender was closed.
    #[error("Appender is closed")]
    Closed,

    /// The configuration cannot be used.
    #[error("Invalid appender configuration: {0}")]
    InvalidConfig(String),

    /// The background committer task failed to join.
    #[error("Committer task failed: {0}")]
    Task(String),
}

/// Convenience type alias for appender results.
pub type AppendResult<T> = Result<T, AppendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_is_transparent() {
        let error: AppendError = GenerationError::MissingGeneration(3).into();
        assert_eq!(error.to_string(), "Generation 3 is missing");
    }

    #[test]
    fn test_io_error_display() {
        let io_error = std::io::Error::other("disk full");
        let error = AppendError::from(io_error);
        assert!(error.to_string().contains("disk full"));
    }
}
