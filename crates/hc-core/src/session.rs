// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Ephemeral connection session, one-to-one with an open connection.

use crate::id::{AgentId, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub agent_id: AgentId,
    pub joined_at_ms: u64,
    #[serde(default)]
    pub edits_count: u64,
    pub current_role: String,
    #[serde(default)]
    pub last_frame_at_ms: u64,
}

impl Session {
    pub fn new(session_id: SessionId, agent_id: AgentId, current_role: String, now_ms: u64) -> Self {
        Self {
            session_id,
            agent_id,
            joined_at_ms: now_ms,
            edits_count: 0,
            current_role,
            last_frame_at_ms: now_ms,
        }
    }

    pub fn record_edit(&mut self, now_ms: u64) {
        self.edits_count += 1;
        self.last_frame_at_ms = now_ms;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
