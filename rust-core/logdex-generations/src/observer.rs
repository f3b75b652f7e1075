// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Rotation observers.
//!
//! Observers receive a payload-free edge signal before every rotation and a
//! second one once the rotation has finished. The list is owned by the
//! rotating component and filled at construction.

use std::fmt;
use std::sync::Arc;

/// Something that wants to know when generations are renumbered.
pub trait RotationObserver: Send + Sync {
    /// Called before any generation is renamed.
    fn rotation_started(&self);

    /// Called after the fresh live generation exists.
    fn rotation_finished(&self) {}
}

impl<F> RotationObserver for F
where
    F: Fn() + Send + Sync,
{
    fn rotation_started(&self) {
        self()
    }
}

/// An ordered list of observers, notified in registration order.
#[derive(Clone, Default)]
pub struct RotationObservers {
    observers: Vec<Arc<dyn RotationObserver>>,
}

impl RotationObservers {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer.
    pub fn push(&mut self, observer: Arc<dyn RotationObserver>) {
        self.observers.push(observer);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, observer: Arc<dyn RotationObserver>) -> Self {
        self.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Signal every observer that a rotation is starting.
    pub fn notify_started(&self) {
        for observer in &self.observers {
            observer.rotation_started();
        }
    }

    /// Signal every observer that a rotation has finished.
    pub fn notify_finished(&self) {
        for observer in &self.observers {
            observer.rotation_finished();
        }
    }
}

impl fmt::Debug for RotationObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationObservers")
            .field("count", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl RotationObserver for Counting {
        fn rotation_started(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn rotation_finished(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_every_observer_is_notified() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let observers = RotationObservers::new().with(a.clone()).with(b.clone());

        observers.notify_started();
        observers.notify_finished();
        observers.notify_started();

        assert_eq!(a.started.load(Ordering::SeqCst), 2);
        assert_eq!(b.started.load(Ordering::SeqCst), 2);
        assert_eq!(a.finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closure_observer() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let observers = RotationObservers::new().with(Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        observers.notify_started();
        observers.notify_finished();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(observers.len(), 1);
    }
}
