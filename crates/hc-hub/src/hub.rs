// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Connection Hub: the live-session registry, broadcast fan-out,
//! and "new connection evicts the prior one" eviction rule (spec §4.7).

use std::collections::HashMap;
use std::sync::Arc;

use hc_core::{AgentId, SessionId};
use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::protocol::ServerFrame;
use crate::queue::OutboundQueue;

/// One live, authenticated connection. Dropping a `LiveSession` aborts
/// its reader and writer tasks — the same abort-on-drop idiom the lock
/// sweeper and timeout checker use for their own background tasks.
pub struct LiveSession {
    pub session_id: SessionId,
    pub queue: Arc<OutboundQueue>,
    tasks: Vec<AbortHandle>,
}

impl LiveSession {
    pub fn new(session_id: SessionId, queue: Arc<OutboundQueue>, tasks: Vec<AbortHandle>) -> Self {
        Self { session_id, queue, tasks }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// At most one live session per identity. Registering a session for an
/// already-connected agent evicts (drops, aborting its tasks) the prior
/// one.
#[derive(Default)]
pub struct ConnectionHub {
    sessions: Mutex<HashMap<AgentId, LiveSession>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` as the live session for `agent_id`, evicting
    /// and returning any prior session so the caller can log the
    /// eviction (the returned value's `Drop` aborts its tasks once
    /// discarded).
    pub fn register(&self, agent_id: AgentId, session: LiveSession) -> Option<LiveSession> {
        self.sessions.lock().insert(agent_id, session)
    }

    /// Remove the live session for `agent_id`, but only if it's still
    /// the one identified by `session_id` — a stale reader/writer task
    /// from an already-evicted session must not clobber its successor.
    pub fn remove_if(&self, agent_id: &AgentId, session_id: &SessionId) -> bool {
        let mut sessions = self.sessions.lock();
        if sessions.get(agent_id).map(|s| &s.session_id) == Some(session_id) {
            sessions.remove(agent_id);
            true
        } else {
            false
        }
    }

    pub fn queue_for(&self, agent_id: &AgentId) -> Option<Arc<OutboundQueue>> {
        self.sessions.lock().get(agent_id).map(|s| s.queue.clone())
    }

    /// Unconditionally drop `agent_id`'s live session, if any — used to
    /// enforce the `SLOW_CONSUMER` close (spec §4.7) where the caller
    /// only has the agent id, not the session id of the connection it
    /// observed overflowing.
    pub fn force_close(&self, agent_id: &AgentId) -> Option<LiveSession> {
        self.sessions.lock().remove(agent_id)
    }

    /// Enqueue `frame` on `agent_id`'s session, if connected. Returns
    /// `Some(agent_id)` if the push overflowed a fully-critical queue
    /// (the caller should close that session with `SLOW_CONSUMER`).
    pub fn send_to(&self, agent_id: &AgentId, frame: ServerFrame) -> Option<AgentId> {
        let queue = self.queue_for(agent_id)?;
        match queue.push(frame) {
            Ok(()) => None,
            Err(_) => Some(agent_id.clone()),
        }
    }

    /// Enqueue `frame` on every live session. Returns the agent ids
    /// whose queue overflowed and must be closed.
    pub fn broadcast(&self, frame: ServerFrame) -> Vec<AgentId> {
        self.broadcast_filtered(frame, |_| true)
    }

    /// Like [`Self::broadcast`] but skipping `exclude`.
    pub fn broadcast_except(&self, exclude: &AgentId, frame: ServerFrame) -> Vec<AgentId> {
        self.broadcast_filtered(frame, |agent_id| agent_id != exclude)
    }

    fn broadcast_filtered(&self, frame: ServerFrame, keep: impl Fn(&AgentId) -> bool) -> Vec<AgentId> {
        let sessions = self.sessions.lock();
        let mut overflowed = Vec::new();
        for (agent_id, session) in sessions.iter() {
            if !keep(agent_id) {
                continue;
            }
            if session.queue.push(frame.clone()).is_err() {
                overflowed.push(agent_id.clone());
            }
        }
        overflowed
    }

    pub fn live_count(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn live_agent_ids(&self) -> Vec<AgentId> {
        self.sessions.lock().keys().cloned().collect()
    }

    pub fn is_connected(&self, agent_id: &AgentId) -> bool {
        self.sessions.lock().contains_key(agent_id)
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
