// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Durable identity record, distinct from the ephemeral [`crate::session::Session`].

use crate::id::AgentId;
use crate::perspective::Perspective;
use serde::{Deserialize, Serialize};

/// One entry in an identity's role history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChange {
    pub role: String,
    pub changed_at_ms: u64,
}

/// A durable agent identity, created by registration and mutated on join
/// and on contribution. Never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub agent_id: AgentId,
    pub display_name: String,
    pub auth_token: String,
    pub role: String,
    #[serde(default)]
    pub perspective: Option<Perspective>,
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_contributions: u64,
    pub created_at_ms: u64,
    pub last_seen_ms: u64,
    #[serde(default)]
    pub role_history: Vec<RoleChange>,
}

impl Identity {
    pub fn new(agent_id: AgentId, display_name: String, auth_token: String, role: String, now_ms: u64) -> Self {
        Self {
            agent_id,
            display_name,
            auth_token,
            role,
            perspective: None,
            total_sessions: 0,
            total_contributions: 0,
            created_at_ms: now_ms,
            last_seen_ms: now_ms,
            role_history: Vec::new(),
        }
    }

    /// Append a role change, leaving `agent_id` untouched.
    pub fn switch_role(&mut self, new_role: String, now_ms: u64) {
        self.role_history.push(RoleChange {
            role: self.role.clone(),
            changed_at_ms: now_ms,
        });
        self.role = new_role;
    }

    pub fn record_join(&mut self, now_ms: u64) {
        self.total_sessions += 1;
        self.last_seen_ms = now_ms;
    }

    pub fn record_contribution(&mut self, now_ms: u64) {
        self.total_contributions += 1;
        self.last_seen_ms = now_ms;
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
