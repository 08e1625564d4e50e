// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hc_core::AgentId;
use std::time::Duration;

fn forever_task() -> AbortHandle {
    let handle = tokio::spawn(async {
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    });
    handle.abort_handle()
}

fn session(id: &str, capacity: usize) -> LiveSession {
    LiveSession::new(SessionId::new(id), Arc::new(OutboundQueue::new(capacity)), vec![forever_task()])
}

#[tokio::test]
async fn register_evicts_the_prior_session_for_the_same_agent() {
    let hub = ConnectionHub::new();
    let a1 = AgentId::new("a1");

    let first = session("s1", 4);
    hub.register(a1.clone(), first);

    let second = session("s2", 4);
    let evicted = hub.register(a1.clone(), second);
    assert!(evicted.is_some());
    drop(evicted);

    // Give the aborted task a tick to actually stop.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(hub.queue_for(&a1).unwrap().len(), 0);
}

#[test]
fn remove_if_only_removes_the_matching_session() {
    let hub = ConnectionHub::new();
    let a1 = AgentId::new("a1");
    hub.register(a1.clone(), session("s1", 4));

    // A stale reference to an already-evicted session must not remove
    // the (different) session that's actually live.
    assert!(!hub.remove_if(&a1, &SessionId::new("stale")));
    assert!(hub.is_connected(&a1));

    assert!(hub.remove_if(&a1, &SessionId::new("s1")));
    assert!(!hub.is_connected(&a1));
}

#[test]
fn broadcast_delivers_to_every_live_session() {
    let hub = ConnectionHub::new();
    let a1 = AgentId::new("a1");
    let a2 = AgentId::new("a2");
    hub.register(a1.clone(), session("s1", 4));
    hub.register(a2.clone(), session("s2", 4));

    let overflowed = hub.broadcast(ServerFrame::SessionLeft { agent_id: a1.clone() });
    assert!(overflowed.is_empty());
    assert_eq!(hub.queue_for(&a1).unwrap().len(), 1);
    assert_eq!(hub.queue_for(&a2).unwrap().len(), 1);
}

#[test]
fn broadcast_except_skips_the_excluded_agent() {
    let hub = ConnectionHub::new();
    let a1 = AgentId::new("a1");
    let a2 = AgentId::new("a2");
    hub.register(a1.clone(), session("s1", 4));
    hub.register(a2.clone(), session("s2", 4));

    hub.broadcast_except(&a1, ServerFrame::SessionLeft { agent_id: a2.clone() });
    assert_eq!(hub.queue_for(&a1).unwrap().len(), 0);
    assert_eq!(hub.queue_for(&a2).unwrap().len(), 1);
}

#[test]
fn send_to_an_unconnected_agent_is_a_no_op() {
    let hub = ConnectionHub::new();
    let overflowed = hub.send_to(&AgentId::new("ghost"), ServerFrame::SessionLeft { agent_id: AgentId::new("ghost") });
    assert!(overflowed.is_none());
}

#[test]
fn live_count_and_agent_ids_reflect_registrations() {
    let hub = ConnectionHub::new();
    let a1 = AgentId::new("a1");
    hub.register(a1.clone(), session("s1", 4));
    assert_eq!(hub.live_count(), 1);
    assert_eq!(hub.live_agent_ids(), vec![a1]);
}

#[test]
fn force_close_drops_the_session_regardless_of_session_id() {
    let hub = ConnectionHub::new();
    let a1 = AgentId::new("a1");
    hub.register(a1.clone(), session("s1", 4));

    let closed = hub.force_close(&a1);
    assert!(closed.is_some());
    assert!(!hub.is_connected(&a1));
}
