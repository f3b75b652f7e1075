// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Logdex Generations crate
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A rotating log is a numbered series of generations. Generation 0 is live
// and mutable; generations 1..=max_backup_index are frozen. Each owns one
// log file and one index directory, paired by name, and offsets recorded in
// an index are only meaningful against the log file of the same number.
//
// Rotation is built from independent, individually testable operations:
//
// - `delete(g)`      -- remove a generation permanently
// - `shift(g)`       -- rename generation g to g + 1 (never overwriting)
// - `shift_frozen()` -- delete the oldest, then shift max-1 ... 1 upward
// - `create_fresh()` -- create an empty generation 0
//
// Renames always proceed from the highest generation down so no rename
// ever lands on a name that is still in use.

pub mod error;
pub mod layout;
pub mod observer;
pub mod set;

pub use error::{GenerationError, GenerationResult};
pub use layout::{GenerationLayout, INDEX_SUFFIX};
pub use observer::{RotationObserver, RotationObservers};
pub use set::{GenerationInfo, GenerationSet};
