// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Lock entity: the transient exclusive right to claim a task.

use crate::id::{AgentId, LockToken, TaskId};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default time-to-live for a freshly acquired lock.
pub const LOCK_TTL: std::time::Duration = std::time::Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Lock {
    pub task_id: TaskId,
    pub locked_by: AgentId,
    pub locked_at: Instant,
    pub expires_at: Instant,
    pub lock_token: LockToken,
}

impl Lock {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Serializable snapshot row for `task-locks.json`. Mirrors [`Lock`] but
/// with wall-clock timestamps instead of opaque `Instant`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSnapshotEntry {
    pub task_id: TaskId,
    pub locked_by: AgentId,
    pub locked_at_ms: u64,
    pub expires_at_ms: u64,
    pub lock_token: LockToken,
}

/// The result clients observe when querying a task's lock state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LockStatus {
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_ms: Option<u64>,
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
