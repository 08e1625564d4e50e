// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic sweep of expired locks.
//!
//! Every tick, scan the lock table, drop anything past its `expires_at`,
//! and notify the caller so it can emit a `lock-expired` event per
//! dropped task. Sweeping never touches Claims: a released lock simply
//! makes `is_available` true again for whoever grabs it next.

use hc_core::{Clock, IdGen, TaskId};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::manager::LockManager;

/// Handle to a spawned sweeper task; aborts the task when dropped.
pub struct SweeperHandle {
    join: JoinHandle<()>,
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Spawn a sweeper loop that ticks every `interval` and calls `on_expired`
/// with the list of task ids whose locks were just dropped.
pub fn spawn_sweeper<C, G, F>(
    manager: Arc<LockManager<C, G>>,
    interval: Duration,
    on_expired: F,
) -> SweeperHandle
where
    C: Clock + 'static,
    G: IdGen + 'static,
    F: Fn(Vec<TaskId>) + Send + 'static,
{
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let expired = manager.sweep_expired();
            if !expired.is_empty() {
                debug!(count = expired.len(), "swept expired locks");
                on_expired(expired);
            }
        }
    });
    SweeperHandle { join }
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
