// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wire protocol: one JSON object per frame, `type`-tagged, carried
//! over a WebSocket connection. See spec §6.

use hc_core::{AgentId, HubError, Intervention, Perspective, ProposalId, Task, TaskId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_value() -> Value {
    Value::Null
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    Create,
    Claim,
    Complete,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Start,
    Progress,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryAction {
    Store,
    Retrieve,
    List,
}

/// A frame submitted by a client. The first frame on any connection
/// MUST be `Auth`; everything else requires an authenticated session.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    Auth {
        display_name: String,
        #[serde(default)]
        auth_token: Option<String>,
        #[serde(default)]
        role: String,
        #[serde(default)]
        perspective: Option<Perspective>,
        #[serde(default)]
        new_agent: bool,
    },
    Message {
        text: String,
    },
    Edit {
        file: String,
        #[serde(default = "default_value")]
        edit: Value,
        version: u64,
    },
    Task {
        action: TaskAction,
        #[serde(default = "default_value")]
        data: Value,
    },
    Vote {
        proposal_id: ProposalId,
        choice: Value,
        #[serde(default)]
        evidence: Vec<String>,
    },
    Swarm {
        objective: String,
        #[serde(default)]
        strategy: String,
        #[serde(default = "default_value")]
        options: Value,
    },
    Workflow {
        workflow_id: WorkflowId,
        action: WorkflowAction,
        #[serde(default = "default_value")]
        data: Value,
    },
    Memory {
        action: MemoryAction,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        value: Option<Value>,
    },
    Whoami,
    SwitchRole {
        new_role: String,
    },
    GetHistory,
}

/// Data payload for `Task { action: Create, .. }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskCreateData {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub priority: Option<hc_core::Priority>,
    pub dependencies: Vec<TaskId>,
    pub required_perspectives: Vec<Perspective>,
    pub evidence_required: bool,
    pub deadline_ms: Option<u64>,
    pub tags: Vec<String>,
}

/// Data payload for `Task { action: Claim | Complete, .. }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskTargetData {
    pub task_id: String,
    pub result: Option<Value>,
}

/// A frame emitted by the server, to one session or broadcast to many.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerFrame {
    AuthSuccess {
        agent_id: AgentId,
        #[serde(skip_serializing_if = "Option::is_none")]
        auth_token: Option<String>,
        is_returning: bool,
        total_sessions: u64,
        total_contributions: u64,
        last_seen: u64,
    },
    AuthFailed {
        reason: String,
    },
    SessionJoined {
        agent_id: AgentId,
        display_name: String,
    },
    SessionLeft {
        agent_id: AgentId,
    },
    Chat {
        from: AgentId,
        text: String,
    },
    Edit {
        file: String,
        edit: Value,
        version: u64,
        conflict: bool,
        conflicts: Vec<hc_core::Edit>,
    },
    DiscussionUpdated {
        file: String,
    },
    TaskCreated {
        task: Task,
    },
    TaskAssigned {
        task_id: TaskId,
        agent_id: AgentId,
    },
    TaskCompleted {
        task_id: TaskId,
        result: Option<Value>,
    },
    TaskTimeout {
        task_id: TaskId,
        agent_id: AgentId,
    },
    TaskList {
        tasks: Vec<Task>,
    },
    Intervention {
        kind: hc_core::InterventionKind,
        reason: String,
        required_action: String,
        deadline: u64,
    },
    DiversityIntervention {
        kind: hc_core::InterventionKind,
        target: AgentId,
        reason: String,
    },
    VoteRecorded {
        proposal_id: ProposalId,
    },
    VoteResolved {
        proposal_id: ProposalId,
        choice: Value,
        diversity_score: f64,
    },
    WorkflowStarted {
        workflow_id: WorkflowId,
    },
    WorkflowUpdated {
        workflow_id: WorkflowId,
    },
    WorkflowCompleted {
        workflow_id: WorkflowId,
    },
    MemoryRetrieved {
        key: String,
        value: Option<Value>,
    },
    MemoryList {
        keys: Vec<String>,
    },
    Stats {
        connected_agents: usize,
        pending_tasks: usize,
        in_progress_tasks: usize,
        overall_diversity: f64,
    },
    WhoamiResult {
        agent_id: AgentId,
        display_name: String,
        role: String,
        perspective: Option<Perspective>,
        total_sessions: u64,
        total_contributions: u64,
    },
    History {
        agent_id: AgentId,
        decisions: Vec<HistoryEntry>,
    },
    Error {
        error: HubError,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub timestamp_ms: u64,
    pub decision: String,
    pub perspective: Perspective,
    pub agreed_with_majority: bool,
    pub evidence_provided: bool,
    pub challenged_assumptions: bool,
}

impl From<hc_core::DecisionRecord> for HistoryEntry {
    fn from(r: hc_core::DecisionRecord) -> Self {
        Self {
            timestamp_ms: r.timestamp_ms,
            decision: r.decision,
            perspective: r.perspective,
            agreed_with_majority: r.agreed_with_majority,
            evidence_provided: r.evidence_provided,
            challenged_assumptions: r.challenged_assumptions,
        }
    }
}

impl From<Intervention> for ServerFrame {
    fn from(i: Intervention) -> Self {
        ServerFrame::Intervention {
            kind: i.kind,
            reason: i.reason,
            required_action: i.required_action,
            deadline: i.deadline_ms,
        }
    }
}

impl From<HubError> for ServerFrame {
    fn from(error: HubError) -> Self {
        ServerFrame::Error { error }
    }
}

impl ServerFrame {
    /// Critical frames are never dropped by the outbound backpressure
    /// policy in spec §4.7: auth outcomes and diversity interventions.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            ServerFrame::AuthSuccess { .. } | ServerFrame::AuthFailed { .. } | ServerFrame::Intervention { .. }
        )
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
