// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame dispatch: translates an authenticated connection's inbound
//! [`ClientFrame`] into calls against the engine/identity store/
//! diversity enforcer, and the resulting outbound frames to deliver.
//!
//! Kept free of any WebSocket or task-spawning concerns so it's
//! exercised directly in tests without a real socket.

use hc_core::{AgentId, Edit, Event, HubError, SessionId, TaskId, Vote, WorkflowId};
use hc_diversity::{resolve_decision, vote_weight, ContextItem, ContributionKind, ContributionRequest};
use serde_json::Value;

use crate::protocol::{
    ClientFrame, HistoryEntry, MemoryAction, ServerFrame, TaskAction, TaskCreateData, TaskTargetData, WorkflowAction,
};
use crate::state::HubState;

/// Identity of the authenticated connection a frame arrived on.
#[derive(Debug, Clone)]
pub struct SessionCtx {
    pub session_id: SessionId,
    pub agent_id: AgentId,
}

/// Where an outbound frame should be delivered.
#[derive(Debug, Clone)]
pub enum Recipient {
    Caller,
    Agent(AgentId),
    Broadcast,
    BroadcastExcept(AgentId),
}

#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Recipient,
    pub frame: ServerFrame,
}

fn to(recipient: Recipient, frame: ServerFrame) -> Outbound {
    Outbound { to: recipient, frame }
}

fn caller(frame: ServerFrame) -> Outbound {
    to(Recipient::Caller, frame)
}

fn broadcast(frame: ServerFrame) -> Outbound {
    to(Recipient::Broadcast, frame)
}

/// Translate one domain [`Event`] into its wire frame, where the wire
/// protocol defines one. Events with no corresponding frame type (pure
/// bookkeeping, or handled by a more specific path already) map to
/// `None`.
pub fn event_to_frame(event: Event) -> Option<ServerFrame> {
    match event {
        Event::TaskCreated { task } => Some(ServerFrame::TaskCreated { task }),
        Event::TaskAssigned { task_id, agent_id } => Some(ServerFrame::TaskAssigned { task_id, agent_id }),
        Event::TaskCompleted { task_id, result } => Some(ServerFrame::TaskCompleted { task_id, result }),
        Event::TaskTimeout { task_id, agent_id } => Some(ServerFrame::TaskTimeout { task_id, agent_id }),
        Event::WorkflowStarted { workflow_id } => Some(ServerFrame::WorkflowStarted { workflow_id }),
        Event::WorkflowUpdated { workflow_id } => Some(ServerFrame::WorkflowUpdated { workflow_id }),
        Event::WorkflowCompleted { workflow_id } => Some(ServerFrame::WorkflowCompleted { workflow_id }),
        Event::Intervention { intervention } => Some(intervention.into()),
        Event::AgentDisconnected { agent_id } => Some(ServerFrame::SessionLeft { agent_id }),
        Event::TaskFailed { .. }
        | Event::LockExpired { .. }
        | Event::EditApplied { .. }
        | Event::EditConflict { .. }
        | Event::VoteRecorded { .. }
        | Event::VoteResolved { .. }
        | Event::SessionJoined { .. }
        | Event::SessionLeft { .. } => None,
    }
}

fn events_to_outbound(events: Vec<Event>) -> Vec<Outbound> {
    events.into_iter().filter_map(event_to_frame).map(broadcast).collect()
}

fn recent_context(state: &HubState) -> Vec<ContextItem> {
    state
        .diversity
        .tracker()
        .recent_history(5)
        .into_iter()
        .map(|r| ContextItem { text: r.decision, agreed_with_majority: r.agreed_with_majority })
        .collect()
}

/// Handle one frame from an already-authenticated session.
pub fn handle(state: &HubState, ctx: &SessionCtx, frame: ClientFrame) -> Vec<Outbound> {
    let now_ms = state.now_ms();
    match frame {
        ClientFrame::Auth { .. } => {
            vec![caller(HubError::AuthFailed("already authenticated on this connection".into()).into())]
        }
        ClientFrame::Message { text } => handle_message(state, ctx, text, now_ms),
        ClientFrame::Edit { file, edit, version } => handle_edit(state, ctx, file, edit, version, now_ms),
        ClientFrame::Task { action, data } => handle_task(state, ctx, action, data),
        ClientFrame::Vote { proposal_id, choice, evidence } => handle_vote(state, ctx, proposal_id, choice, evidence, now_ms),
        ClientFrame::Swarm { objective, strategy, options } => handle_swarm(state, objective, strategy, options),
        ClientFrame::Workflow { workflow_id, action, data } => handle_workflow(state, workflow_id, action, data),
        ClientFrame::Memory { action, key, value } => handle_memory(state, action, key, value),
        ClientFrame::Whoami => handle_whoami(state, ctx),
        ClientFrame::SwitchRole { new_role } => handle_switch_role(state, ctx, new_role, now_ms),
        ClientFrame::GetHistory => handle_get_history(state, ctx),
    }
}

fn handle_message(state: &HubState, ctx: &SessionCtx, text: String, now_ms: u64) -> Vec<Outbound> {
    let context = recent_context(state);
    let connected_peers = state.hub.live_count().saturating_sub(1);
    let verdict = state.diversity.check_contribution(
        ContributionRequest {
            agent_id: ctx.agent_id.clone(),
            content: &text,
            kind: ContributionKind::Message,
            connected_peers,
            recent_context: &context,
            agreed_with_majority: false,
        },
        now_ms,
    );

    if !verdict.allowed {
        let Some(intervention) = verdict.intervention else {
            return vec![caller(HubError::Internal.into())];
        };
        return vec![caller(intervention.into())];
    }

    state.identities.record_contribution(&ctx.agent_id, now_ms);

    let delivered_text = match &verdict.content_modifier {
        Some(modifier) => format!("{modifier} {text}"),
        None => text,
    };
    let mut out = vec![broadcast(ServerFrame::Chat { from: ctx.agent_id.clone(), text: delivered_text })];
    if let Some(intervention) = verdict.intervention {
        out.push(caller(intervention.into()));
    }
    out
}

fn handle_edit(state: &HubState, ctx: &SessionCtx, file: String, edit_op: Value, version: u64, now_ms: u64) -> Vec<Outbound> {
    let edit = Edit { file: file.clone(), op: edit_op.clone(), version_clock: version, session_ref: ctx.session_id.clone() };
    let (report, _event) = state.engine.apply_edit(edit);
    state.identities.record_contribution(&ctx.agent_id, now_ms);

    let mut out = vec![caller(ServerFrame::Edit {
        file: file.clone(),
        edit: edit_op,
        version,
        conflict: report.conflict,
        conflicts: report.conflicts,
    })];
    if !report.conflict {
        out.push(to(Recipient::BroadcastExcept(ctx.agent_id.clone()), ServerFrame::DiscussionUpdated { file }));
    }
    out
}

fn handle_task(state: &HubState, ctx: &SessionCtx, action: TaskAction, data: Value) -> Vec<Outbound> {
    match action {
        TaskAction::Create => {
            let Ok(payload) = serde_json::from_value::<TaskCreateData>(data) else {
                return vec![caller(HubError::Internal.into())];
            };
            let config = hc_core::TaskConfig {
                kind: payload.kind,
                description: payload.description,
                priority: payload.priority,
                dependencies: payload.dependencies,
                required_perspectives: payload.required_perspectives,
                evidence_required: payload.evidence_required,
                deadline_ms: payload.deadline_ms,
                tags: payload.tags,
            };
            let (_task, events) = state.engine.create_task(config);
            events_to_outbound(events)
        }
        TaskAction::Claim => {
            let Ok(payload) = serde_json::from_value::<TaskTargetData>(data) else {
                return vec![caller(HubError::Internal.into())];
            };
            match state.engine.assign_task(&TaskId::new(payload.task_id), &ctx.agent_id) {
                Ok(event) => events_to_outbound(vec![event]),
                Err(e) => vec![caller(hc_core::HubError::from(e).into())],
            }
        }
        TaskAction::Complete => {
            let Ok(payload) = serde_json::from_value::<TaskTargetData>(data) else {
                return vec![caller(HubError::Internal.into())];
            };
            match state.engine.complete_task(&TaskId::new(payload.task_id), &ctx.agent_id, payload.result) {
                Ok(event) => events_to_outbound(vec![event]),
                Err(e) => vec![caller(hc_core::HubError::from(e).into())],
            }
        }
        TaskAction::List => vec![caller(ServerFrame::TaskList { tasks: state.engine.list_tasks() })],
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
struct SwarmOptions {
    mode: String,
    count: usize,
    ensure_diversity: bool,
}

impl Default for SwarmOptions {
    fn default() -> Self {
        Self { mode: "coder".to_string(), count: 1, ensure_diversity: false }
    }
}

fn handle_swarm(state: &HubState, objective: String, strategy: String, options: Value) -> Vec<Outbound> {
    let options: SwarmOptions = serde_json::from_value(options).unwrap_or_default();
    let kind = if strategy.is_empty() { "code".to_string() } else { strategy };
    let config = hc_core::TaskConfig { kind, description: objective, ..Default::default() };

    let (agents, events) = state.engine.spawn_agents(&options.mode, Some(config), options.count.max(1));
    if options.ensure_diversity {
        for agent in &agents {
            state.diversity.tracker().assign_new_agent(agent.agent_id.clone(), None);
        }
    }
    events_to_outbound(events)
}

fn handle_workflow(state: &HubState, workflow_id: WorkflowId, action: WorkflowAction, data: Value) -> Vec<Outbound> {
    let result = match action {
        WorkflowAction::Start => Ok(state.engine.start_workflow(workflow_id, data)),
        WorkflowAction::Progress => state.engine.update_workflow(&workflow_id, data),
        WorkflowAction::Complete => state.engine.complete_workflow(&workflow_id, data),
    };
    match result {
        Ok(event) => events_to_outbound(vec![event]),
        Err(e) => vec![caller(hc_core::HubError::from(e).into())],
    }
}

fn handle_memory(state: &HubState, action: MemoryAction, key: Option<String>, value: Option<Value>) -> Vec<Outbound> {
    match action {
        MemoryAction::Store => {
            let (Some(key), Some(value)) = (key, value) else {
                return vec![caller(HubError::NotFound("key or value missing".into()).into())];
            };
            state.engine.store_memory(&key, value.clone());
            vec![caller(ServerFrame::MemoryRetrieved { key, value: Some(value) })]
        }
        MemoryAction::Retrieve => {
            let Some(key) = key else {
                return vec![caller(HubError::NotFound("key missing".into()).into())];
            };
            let value = state.engine.retrieve_memory(&key);
            vec![caller(ServerFrame::MemoryRetrieved { key, value })]
        }
        MemoryAction::List => vec![caller(ServerFrame::MemoryList { keys: state.engine.list_memory() })],
    }
}

fn handle_vote(
    state: &HubState,
    ctx: &SessionCtx,
    proposal_id: hc_core::ProposalId,
    choice: Value,
    evidence: Vec<String>,
    now_ms: u64,
) -> Vec<Outbound> {
    let tracker = state.diversity.tracker();
    let perspective = tracker.perspective_of(&ctx.agent_id);
    let is_sole = tracker.is_sole_bearer(&ctx.agent_id);
    let skeptic_identifies_risk =
        perspective == Some(hc_core::Perspective::Skeptic) && evidence.iter().any(|e| e.to_lowercase().contains("risk"));
    let weight = vote_weight(perspective, is_sole, &evidence, skeptic_identifies_risk);

    let context = recent_context(state);
    let connected_peers = state.hub.live_count().saturating_sub(1);
    let content = vote_content(&choice, &evidence);
    let verdict = state.diversity.check_contribution(
        ContributionRequest {
            agent_id: ctx.agent_id.clone(),
            content: &content,
            kind: ContributionKind::Decision,
            connected_peers,
            recent_context: &context,
            agreed_with_majority: false,
        },
        now_ms,
    );

    if !verdict.allowed {
        let Some(intervention) = verdict.intervention else {
            return vec![caller(HubError::Internal.into())];
        };
        return vec![caller(intervention.into())];
    }

    state.identities.record_contribution(&ctx.agent_id, now_ms);

    let vote = Vote { proposal_id: proposal_id.clone(), session_ref: ctx.session_id.clone(), choice, weight, evidence, perspective };
    state.engine.record_vote(vote);

    let mut out = vec![caller(ServerFrame::VoteRecorded { proposal_id: proposal_id.clone() })];
    if let Some(intervention) = verdict.intervention {
        out.push(caller(intervention.into()));
    }
    if state.engine.check_voting_complete(&proposal_id, state.non_offline_agent_count()) {
        let votes = state.engine.votes_for(&proposal_id);
        if let Some(resolution) = resolve_decision(&votes) {
            out.push(broadcast(ServerFrame::VoteResolved {
                proposal_id,
                choice: resolution.choice,
                diversity_score: resolution.diversity_score,
            }));
        }
    }
    out
}

/// Text for the Analyzer to score a vote against: the choice rendered
/// as text plus whatever evidence strings the client supplied, so the
/// evidence-quality regexes see the same content a chat message would.
fn vote_content(choice: &Value, evidence: &[String]) -> String {
    let choice_str = match choice {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if evidence.is_empty() {
        choice_str
    } else {
        format!("{choice_str} {}", evidence.join(" "))
    }
}

fn handle_whoami(state: &HubState, ctx: &SessionCtx) -> Vec<Outbound> {
    let Some(identity) = state.identities.find_by_agent_id(&ctx.agent_id) else {
        return vec![caller(HubError::NotFound("identity".into()).into())];
    };
    vec![caller(ServerFrame::WhoamiResult {
        agent_id: identity.agent_id,
        display_name: identity.display_name,
        role: identity.role,
        perspective: identity.perspective,
        total_sessions: identity.total_sessions,
        total_contributions: identity.total_contributions,
    })]
}

fn handle_switch_role(state: &HubState, ctx: &SessionCtx, new_role: String, now_ms: u64) -> Vec<Outbound> {
    match state.identities.switch_role(&ctx.agent_id, new_role, now_ms) {
        Ok(identity) => vec![caller(ServerFrame::WhoamiResult {
            agent_id: identity.agent_id,
            display_name: identity.display_name,
            role: identity.role,
            perspective: identity.perspective,
            total_sessions: identity.total_sessions,
            total_contributions: identity.total_contributions,
        })],
        Err(e) => vec![caller(hc_core::HubError::from(e).into())],
    }
}

fn handle_get_history(state: &HubState, ctx: &SessionCtx) -> Vec<Outbound> {
    let decisions: Vec<HistoryEntry> =
        state.diversity.tracker().history_for(&ctx.agent_id).into_iter().map(HistoryEntry::from).collect();
    vec![caller(ServerFrame::History { agent_id: ctx.agent_id.clone(), decisions })]
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
