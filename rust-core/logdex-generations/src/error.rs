// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Generations - Error types
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while inspecting or rearranging generations on disk.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// An I/O error while creating, deleting or inspecting artifacts.
    #[error("Generation I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generation expected to exist has neither log file nor index.
    #[error("Generation {0} is missing")]
    MissingGeneration(u32),

    /// A rename target is already taken; renaming would overwrite it.
    #[error("Generation {generation} is occupied at {path}")]
    Occupied {
        /// The generation that would have been overwritten.
        generation: u32,
        /// The conflicting artifact.
        path: PathBuf,
    },

    /// Renaming one artifact of a generation failed. If the paired artifact
    /// had already moved, it was moved back.
    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        /// Source path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// A generation outside `0..=max_backup_index` was addressed.
    #[error("Generation {generation} is beyond max backup index {max_backup_index}")]
    OutOfRange {
        /// The requested generation.
        generation: u32,
        /// The configured bound.
        max_backup_index: u32,
    },
}

/// Convenience type alias for generation results.
pub type GenerationResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_occupied() {
        let error = GenerationError::Occupied {
            generation: 2,
            path: PathBuf::from("/var/log/app.log.2"),
        };
        let message = format!("{error}");
        assert!(message.contains("Generation 2"));
        assert!(message.contains("app.log.2"));
    }

    #[test]
    fn test_error_display_out_of_range() {
        let error = GenerationError::OutOfRange {
            generation: 9,
            max_backup_index: 3,
        };
        assert!(error.to_string().contains("max backup index 3"));
    }
}
