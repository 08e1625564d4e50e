// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic check for expired task-claim deadlines, the orchestration
//! counterpart to the Lock Manager's own sweeper.

use std::sync::Arc;
use std::time::Duration;

use hc_core::{Clock, Event, IdGen};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::Engine;

/// Handle to a spawned timeout-checker task; aborts the task when dropped.
pub struct TimeoutCheckerHandle {
    join: JoinHandle<()>,
}

impl Drop for TimeoutCheckerHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Spawn a loop that ticks every `interval`, calls
/// [`Engine::handle_task_timeouts`], and forwards any resulting events
/// to `on_events`.
pub fn spawn_timeout_checker<C, G, F>(engine: Arc<Engine<C, G>>, interval: Duration, on_events: F) -> TimeoutCheckerHandle
where
    C: Clock + 'static,
    G: IdGen + 'static,
    F: Fn(Vec<Event>) + Send + 'static,
{
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let events = engine.handle_task_timeouts();
            if !events.is_empty() {
                debug!(count = events.len(), "fired task timeouts");
                on_events(events);
            }
        }
    });
    TimeoutCheckerHandle { join }
}
