// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn req(name: &str, token: Option<&str>) -> AuthRequest {
    AuthRequest {
        display_name: name.to_string(),
        auth_token: token.map(str::to_string),
        role: "coder".to_string(),
        perspective: None,
        new_agent: false,
    }
}

#[test]
fn first_time_join_issues_a_token() {
    let store = IdentityStore::new();
    let outcome = store.authenticate(req("alice", None), 1_000).unwrap();
    assert!(!outcome.is_returning);
    assert!(outcome.issued_token.is_some());
    assert_eq!(outcome.identity.display_name, "alice");
    assert_eq!(outcome.identity.total_sessions, 1);
}

#[test]
fn token_round_trip_returns_same_agent_id() {
    let store = IdentityStore::new();
    let first = store.authenticate(req("alice", None), 1_000).unwrap();
    let token = first.issued_token.unwrap();

    let second = store.authenticate(req("alice", Some(&token)), 2_000).unwrap();
    assert!(second.is_returning);
    assert_eq!(second.identity.agent_id, first.identity.agent_id);
    assert_eq!(second.identity.total_sessions, 2, "total_sessions must increase monotonically");
}

#[test]
fn mismatched_token_fails_auth() {
    let store = IdentityStore::new();
    store.authenticate(req("alice", None), 1_000).unwrap();
    let err = store.authenticate(req("alice", Some("wrong-token")), 2_000).unwrap_err();
    assert_eq!(err, IdentityError::TokenMismatch);
}

#[test]
fn absent_token_against_an_existing_name_fails_auth() {
    let store = IdentityStore::new();
    store.authenticate(req("alice", None), 1_000).unwrap();
    let err = store.authenticate(req("alice", None), 2_000).unwrap_err();
    assert_eq!(err, IdentityError::TokenMismatch);
}

#[test]
fn register_fails_name_taken_for_a_duplicate_display_name() {
    let store = IdentityStore::new();
    store.register("alice".to_string(), "coder".to_string(), 1_000).unwrap();
    let err = store.register("alice".to_string(), "reviewer".to_string(), 2_000).unwrap_err();
    assert_eq!(err, IdentityError::NameTaken);
}

#[test]
fn switch_role_preserves_agent_id_and_records_history() {
    let store = IdentityStore::new();
    let outcome = store.authenticate(req("alice", None), 1_000).unwrap();
    let agent_id = outcome.identity.agent_id.clone();

    let updated = store.switch_role(&agent_id, "reviewer".to_string(), 2_000).unwrap();
    assert_eq!(updated.agent_id, agent_id);
    assert_eq!(updated.role, "reviewer");
    assert_eq!(updated.role_history.len(), 1);
    assert_eq!(updated.role_history[0].role, "coder");
}

#[test]
fn switch_role_on_unknown_agent_fails_not_found() {
    let store = IdentityStore::new();
    let err = store
        .switch_role(&hc_core::AgentId::new("agent-ghost"), "reviewer".to_string(), 1_000)
        .unwrap_err();
    assert_eq!(err, IdentityError::NotFound);
}

#[test]
fn record_contribution_increments_without_touching_sessions() {
    let store = IdentityStore::new();
    let outcome = store.authenticate(req("alice", None), 1_000).unwrap();
    store.record_contribution(&outcome.identity.agent_id, 1_500);
    store.record_contribution(&outcome.identity.agent_id, 1_600);

    let identity = store.find_by_agent_id(&outcome.identity.agent_id).unwrap();
    assert_eq!(identity.total_contributions, 2);
    assert_eq!(identity.total_sessions, 1);
}

#[test]
fn identity_persistence_survives_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("identities.json");

    let token = {
        let store = IdentityStore::new().with_persistence(path.clone());
        let outcome = store.authenticate(req("alice", None), 1_000).unwrap();
        outcome.issued_token.unwrap()
    };

    let reloaded = IdentityStore::new().with_persistence(path);
    let outcome = reloaded.authenticate(req("alice", Some(&token)), 2_000).unwrap();
    assert!(outcome.is_returning);
    assert_eq!(outcome.identity.total_sessions, 2);
}

#[test]
fn new_agent_flag_rejects_an_existing_name() {
    let store = IdentityStore::new();
    store.authenticate(req("alice", None), 1_000).unwrap();

    let mut second = req("alice", None);
    second.new_agent = true;
    let err = store.authenticate(second, 2_000).unwrap_err();
    assert_eq!(err, IdentityError::NameTaken);
}
