// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime agent entity: distinct from [`hc_core::Identity`], which is
//! the durable record. An `Agent` exists only while the engine has a
//! live or recently-live connection to track for assignment purposes.

use hc_core::{AgentId, Perspective};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Busy,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    /// Work mode, e.g. `"coder"`, `"reviewer"` — matched against
    /// [`hc_core::compatible_modes`] during auto-assignment.
    pub mode: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub perspective: Option<Perspective>,
    pub joined_at_ms: u64,
}

impl Agent {
    pub fn new(agent_id: AgentId, mode: impl Into<String>, now_ms: u64) -> Self {
        Self {
            agent_id,
            mode: mode.into(),
            status: AgentStatus::Idle,
            perspective: None,
            joined_at_ms: now_ms,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.status, AgentStatus::Idle)
    }
}

/// Fixed capability vector per synthetic spawn mode, used by
/// `spawn_agents`. Mirrors the compatibility table in
/// [`hc_core::compatible_modes`] but keyed the other direction (mode →
/// kinds it can do) for agent-creation purposes.
pub fn capabilities_for_mode(mode: &str) -> &'static [&'static str] {
    match mode {
        "coder" | "tdd" | "debugger" => &["code"],
        "reviewer" | "tester" | "analyzer" => &["review", "research"],
        "architect" | "designer" => &["design"],
        "researcher" => &["research"],
        "documenter" => &["documentation"],
        _ => &[],
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
