// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Background committer.
//!
//! Periodically publishes the live index so readers see recent records.
//! The task is owned by a [`Committer`] handle: `shutdown()` stops the
//! ticker, runs one last commit and joins the task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace};

use crate::appender::IndexedAppender;
use crate::error::{AppendError, AppendResult};

/// Handle on the periodic commit task.
#[derive(Debug)]
pub struct Committer {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Committer {
    /// Start committing at the appender's configured flush interval.
    pub fn start(appender: Arc<IndexedAppender>) -> Self {
        let interval = appender.config().flush_interval();
        Self::start_with_interval(appender, interval)
    }

    /// Start committing every `interval`. Must be called inside a Tokio runtime.
    pub fn start_with_interval(appender: Arc<IndexedAppender>, interval: Duration) -> Self {
        let (shutdown, mut stop) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = interval.as_millis() as u64, "Background committer started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        trace!("Commit tick");
                        commit_once(&appender).await;
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }

            commit_once(&appender).await;
            info!("Background committer stopped");
        });

        Self { shutdown, handle }
    }

    /// Stop the task after a final commit and wait for it.
    pub async fn shutdown(self) -> AppendResult<()> {
        // The receiver is gone only if the task already exited.
        let _ = self.shutdown.send(true);
        self.handle
            .await
            .map_err(|e| AppendError::Task(e.to_string()))
    }
}

async fn commit_once(appender: &Arc<IndexedAppender>) {
    let appender = Arc::clone(appender);
    match tokio::task::spawn_blocking(move || appender.commit()).await {
        Ok(Ok(published)) => {
            if published > 0 {
                debug!(published, "Background commit");
            }
        }
        Ok(Err(AppendError::Closed)) => trace!("Appender closed, skipping commit"),
        Ok(Err(err)) => error!(error = %err, "Background commit failed"),
        Err(err) => error!(error = %err, "Background commit task panicked"),
    }
}
