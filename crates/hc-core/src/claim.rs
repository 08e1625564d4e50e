// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Claim entity: the durable long-term ownership record for a task.

use crate::id::{AgentId, TaskId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    InProgress,
    Completed,
}

impl ClaimStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, ClaimStatus::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub task_id: TaskId,
    pub agent: AgentId,
    pub claimed_at_ms: u64,
    pub status: ClaimStatus,
}

impl Claim {
    pub fn new(task_id: TaskId, agent: AgentId, now_ms: u64) -> Self {
        Self {
            task_id,
            agent,
            claimed_at_ms: now_ms,
            status: ClaimStatus::Pending,
        }
    }
}

#[cfg(test)]
#[path = "claim_tests.rs"]
mod tests;
