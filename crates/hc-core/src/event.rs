// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Domain events emitted by the orchestration engine and lock manager.
//!
//! Events are self-sufficient: each variant carries everything a
//! subscriber needs, so ordering between "emit event" and "persist
//! snapshot" is never load-bearing.

use crate::edit::Edit;
use crate::id::{AgentId, LockToken, ProposalId, TaskId, WorkflowId};
use crate::intervention::Intervention;
use crate::task::Task;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    TaskCreated { task: Task },
    TaskAssigned { task_id: TaskId, agent_id: AgentId },
    TaskCompleted { task_id: TaskId, result: Option<serde_json::Value> },
    TaskFailed { task_id: TaskId, reason: String },
    TaskTimeout { task_id: TaskId, agent_id: AgentId },
    LockExpired { task_id: TaskId, lock_token: LockToken },
    EditApplied { edit: Edit },
    EditConflict { edit: Edit, conflicts: Vec<Edit> },
    VoteRecorded { proposal_id: ProposalId },
    VoteResolved { proposal_id: ProposalId, choice: serde_json::Value, diversity_score: f64 },
    WorkflowStarted { workflow_id: WorkflowId },
    WorkflowUpdated { workflow_id: WorkflowId },
    WorkflowCompleted { workflow_id: WorkflowId },
    Intervention { intervention: Intervention },
    AgentDisconnected { agent_id: AgentId },
    SessionJoined { agent_id: AgentId },
    SessionLeft { agent_id: AgentId },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
