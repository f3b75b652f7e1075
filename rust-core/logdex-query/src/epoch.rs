// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Rotation epoch tracking for in-process readers.

use std::sync::atomic::{AtomicU64, Ordering};

use logdex_generations::RotationObserver;

/// Counts pre-rotation signals.
///
/// Register one with the appender and hand it to the query engine; a scan
/// that sees the count change knows the generation numbers it is walking
/// were reassigned underneath it.
#[derive(Debug, Default)]
pub struct RotationEpoch {
    epoch: AtomicU64,
}

impl RotationEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

impl RotationObserver for RotationEpoch {
    fn rotation_started(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }
}
