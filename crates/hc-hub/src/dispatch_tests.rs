// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hc_core::AgentId;
use hc_storage::{Config, SwarmMode, Workspace};
use serde_json::json;

fn state() -> HubState {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    let config = Config { swarm_mode: SwarmMode::Centralized, ..Config::default() };
    HubState::new(workspace, config)
}

fn ctx(state: &HubState, agent: &str, mode: &str) -> SessionCtx {
    let agent_id = AgentId::new(agent);
    state.engine.register_agent(agent_id.clone(), mode);
    SessionCtx { session_id: SessionId::new(format!("sess-{agent}")), agent_id }
}

fn only_frame(out: Vec<Outbound>) -> ServerFrame {
    assert_eq!(out.len(), 1, "expected exactly one outbound frame, got {out:?}");
    out.into_iter().next().unwrap().frame
}

#[test]
fn a_second_auth_frame_on_an_authenticated_connection_is_rejected() {
    let state = state();
    let ctx = ctx(&state, "a1", "coder");
    let out = handle(&state, &ctx, ClientFrame::Auth { display_name: "a1".into(), auth_token: None, role: "coder".into(), perspective: None, new_agent: false });
    let Outbound { to, frame } = only_frame_pair(out);
    assert!(matches!(to, Recipient::Caller));
    assert!(matches!(frame, ServerFrame::Error { .. }));
}

#[test]
fn a_chat_message_broadcasts_as_a_chat_frame_to_the_caller() {
    let state = state();
    let ctx = ctx(&state, "a1", "coder");
    let out = handle(&state, &ctx, ClientFrame::Message { text: "hello".into() });
    assert_eq!(out.len(), 1);
    let Outbound { to, frame } = out.into_iter().next().unwrap();
    assert!(matches!(to, Recipient::Broadcast));
    match frame {
        ServerFrame::Chat { from, text } => {
            assert_eq!(from, ctx.agent_id);
            assert_eq!(text, "hello");
        }
        other => panic!("expected Chat, got {other:?}"),
    }
}

#[test]
fn task_create_then_list_round_trips_through_the_engine() {
    let state = state();
    let ctx = ctx(&state, "a1", "coder");

    let data = json!({"type": "code", "description": "implement the thing"});
    let out = handle(&state, &ctx, ClientFrame::Task { action: TaskAction::Create, data });
    assert_eq!(out.len(), 1);
    let created = match &out[0].frame {
        ServerFrame::TaskCreated { task } => task.clone(),
        other => panic!("expected TaskCreated, got {other:?}"),
    };
    assert_eq!(created.kind, "code");

    let listed = handle(&state, &ctx, ClientFrame::Task { action: TaskAction::List, data: Value::Null });
    match only_frame(listed) {
        ServerFrame::TaskList { tasks } => assert_eq!(tasks.len(), 1),
        other => panic!("expected TaskList, got {other:?}"),
    }
}

#[test]
fn claiming_an_unknown_task_reports_an_error_frame_to_the_caller() {
    let state = state();
    let ctx = ctx(&state, "a1", "coder");
    let out = handle(
        &state,
        &ctx,
        ClientFrame::Task { action: TaskAction::Claim, data: json!({"task_id": "missing"}) },
    );
    let Outbound { to, frame } = only_frame_pair(out);
    assert!(matches!(to, Recipient::Caller));
    assert!(matches!(frame, ServerFrame::Error { .. }));
}

fn only_frame_pair(out: Vec<Outbound>) -> Outbound {
    assert_eq!(out.len(), 1);
    out.into_iter().next().unwrap()
}

#[test]
fn claim_then_complete_a_centrally_assigned_task() {
    let state = state();
    let creator = ctx(&state, "a1", "coder");
    let worker = ctx(&state, "a2", "coder");

    let created = handle(&state, &creator, ClientFrame::Task { action: TaskAction::Create, data: json!({"type": "code", "description": "x"}) });
    let task_id = match &created[0].frame {
        ServerFrame::TaskCreated { task } => task.task_id.clone(),
        other => panic!("expected TaskCreated, got {other:?}"),
    };

    let claimed = handle(&state, &worker, ClientFrame::Task { action: TaskAction::Claim, data: json!({"task_id": task_id.as_str()}) });
    match only_frame(claimed) {
        ServerFrame::TaskAssigned { agent_id, .. } => assert_eq!(agent_id, worker.agent_id),
        other => panic!("expected TaskAssigned, got {other:?}"),
    }

    let completed = handle(
        &state,
        &worker,
        ClientFrame::Task { action: TaskAction::Complete, data: json!({"task_id": task_id.as_str(), "result": {"ok": true}}) },
    );
    match only_frame(completed) {
        ServerFrame::TaskCompleted { result, .. } => assert_eq!(result, Some(json!({"ok": true}))),
        other => panic!("expected TaskCompleted, got {other:?}"),
    }
}

#[test]
fn memory_store_then_retrieve_then_list_reflect_what_was_stored() {
    let state = state();
    let ctx = ctx(&state, "a1", "coder");

    handle(&state, &ctx, ClientFrame::Memory { action: MemoryAction::Store, key: Some("k".into()), value: Some(json!(1)) });
    let retrieved = handle(&state, &ctx, ClientFrame::Memory { action: MemoryAction::Retrieve, key: Some("k".into()), value: None });
    match only_frame(retrieved) {
        ServerFrame::MemoryRetrieved { key, value } => {
            assert_eq!(key, "k");
            assert_eq!(value, Some(json!(1)));
        }
        other => panic!("expected MemoryRetrieved, got {other:?}"),
    }

    let listed = handle(&state, &ctx, ClientFrame::Memory { action: MemoryAction::List, key: None, value: None });
    match only_frame(listed) {
        ServerFrame::MemoryList { keys } => assert_eq!(keys, vec!["k".to_string()]),
        other => panic!("expected MemoryList, got {other:?}"),
    }
}

#[test]
fn memory_retrieve_of_a_missing_key_returns_none_not_an_error() {
    let state = state();
    let ctx = ctx(&state, "a1", "coder");
    let out = handle(&state, &ctx, ClientFrame::Memory { action: MemoryAction::Retrieve, key: Some("absent".into()), value: None });
    match only_frame(out) {
        ServerFrame::MemoryRetrieved { key, value } => {
            assert_eq!(key, "absent");
            assert_eq!(value, None);
        }
        other => panic!("expected MemoryRetrieved, got {other:?}"),
    }
}

#[test]
fn whoami_reports_the_authenticated_identity() {
    let state = state();
    let agent_id = AgentId::new("a1");
    state.identities.authenticate(
        hc_identity::AuthRequest { display_name: "a1".into(), auth_token: None, role: "coder".into(), perspective: None, new_agent: false },
        state.now_ms(),
    ).unwrap();
    let ctx = SessionCtx { session_id: SessionId::new("s1"), agent_id: agent_id.clone() };

    let out = handle(&state, &ctx, ClientFrame::Whoami);
    match only_frame(out) {
        ServerFrame::WhoamiResult { agent_id: id, role, .. } => {
            assert_eq!(id, agent_id);
            assert_eq!(role, "coder");
        }
        other => panic!("expected WhoamiResult, got {other:?}"),
    }
}

#[test]
fn switch_role_updates_the_identity_and_echoes_it_back() {
    let state = state();
    let agent_id = AgentId::new("a1");
    state.identities.authenticate(
        hc_identity::AuthRequest { display_name: "a1".into(), auth_token: None, role: "coder".into(), perspective: None, new_agent: false },
        state.now_ms(),
    ).unwrap();
    let ctx = SessionCtx { session_id: SessionId::new("s1"), agent_id: agent_id.clone() };

    let out = handle(&state, &ctx, ClientFrame::SwitchRole { new_role: "reviewer".into() });
    match only_frame(out) {
        ServerFrame::WhoamiResult { role, .. } => assert_eq!(role, "reviewer"),
        other => panic!("expected WhoamiResult, got {other:?}"),
    }
}

#[test]
fn get_history_returns_an_empty_list_for_an_agent_with_no_recorded_decisions() {
    let state = state();
    let ctx = ctx(&state, "a1", "coder");
    let out = handle(&state, &ctx, ClientFrame::GetHistory);
    match only_frame(out) {
        ServerFrame::History { agent_id, decisions } => {
            assert_eq!(agent_id, ctx.agent_id);
            assert!(decisions.is_empty());
        }
        other => panic!("expected History, got {other:?}"),
    }
}

#[test]
fn a_vote_is_recorded_into_the_diversity_tracker_and_resolves_when_quorum_is_reached() {
    let state = state();
    let ctx = ctx(&state, "a1", "coder");

    let out = handle(
        &state,
        &ctx,
        ClientFrame::Vote {
            proposal_id: hc_core::ProposalId::new("p1"),
            choice: json!("approve"),
            evidence: vec!["benchmark shows a 20% gain".into()],
        },
    );

    assert!(out.iter().any(|o| matches!(o.frame, ServerFrame::VoteRecorded { .. })), "expected a VoteRecorded frame, got {out:?}");
    assert!(
        out.iter().any(|o| matches!(o.frame, ServerFrame::VoteResolved { .. })),
        "the lone registered agent is quorum of one, so the vote should resolve immediately: got {out:?}"
    );

    let history = state.diversity.tracker().history_for(&ctx.agent_id);
    assert_eq!(history.len(), 1, "the vote should flow through check_contribution into the decision history");
    assert!(history[0].evidence_provided, "the vote's evidence text should have scored as evidence-backed");
}

#[test]
fn event_to_frame_maps_task_created_but_drops_events_with_no_wire_frame() {
    let task = hc_core::Task {
        task_id: hc_core::TaskId::new("t1"),
        kind: "code".into(),
        description: "x".into(),
        status: hc_core::TaskStatus::Pending,
        priority: hc_core::Priority::Medium,
        dependencies: Vec::new(),
        required_perspectives: Vec::new(),
        evidence_required: false,
        deadline_ms: None,
        tags: Vec::new(),
        assigned_to: None,
        result: None,
        created_at_ms: 0,
    };
    assert!(matches!(event_to_frame(Event::TaskCreated { task }), Some(ServerFrame::TaskCreated { .. })));
    assert!(event_to_frame(Event::SessionLeft { agent_id: AgentId::new("a1") }).is_none());
}
