// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hc_core::AgentId;

fn chat(text: &str) -> ServerFrame {
    ServerFrame::Chat { from: AgentId::new("a1"), text: text.to_string() }
}

fn auth_failed(reason: &str) -> ServerFrame {
    ServerFrame::AuthFailed { reason: reason.to_string() }
}

#[test]
fn push_within_capacity_just_appends() {
    let q = OutboundQueue::new(2);
    q.push(chat("one")).unwrap();
    q.push(chat("two")).unwrap();
    assert_eq!(q.len(), 2);
}

#[test]
fn overflow_drops_the_oldest_non_critical_frame() {
    let q = OutboundQueue::new(2);
    q.push(chat("one")).unwrap();
    q.push(chat("two")).unwrap();
    q.push(chat("three")).unwrap();

    assert_eq!(q.len(), 2);
}

#[tokio::test]
async fn overflow_preserves_fifo_order_after_eviction() {
    let q = OutboundQueue::new(2);
    q.push(chat("one")).unwrap();
    q.push(chat("two")).unwrap();
    q.push(chat("three")).unwrap();

    match q.pop().await {
        ServerFrame::Chat { text, .. } => assert_eq!(text, "two"),
        other => panic!("unexpected frame: {other:?}"),
    }
    match q.pop().await {
        ServerFrame::Chat { text, .. } => assert_eq!(text, "three"),
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn critical_frames_are_never_evicted() {
    let q = OutboundQueue::new(1);
    q.push(auth_failed("first")).unwrap();
    // No non-critical frame to evict and the new frame isn't critical:
    // it's simply dropped, the critical backlog is preserved.
    q.push(chat("dropped")).unwrap();
    assert_eq!(q.len(), 1);
}

#[test]
fn a_full_queue_of_critical_frames_rejects_another_critical_frame() {
    let q = OutboundQueue::new(1);
    q.push(auth_failed("first")).unwrap();
    let result = q.push(auth_failed("second"));
    assert!(matches!(result, Err(hc_core::HubError::SlowConsumer)));
}

#[test]
fn a_critical_frame_evicts_a_queued_non_critical_frame_to_make_room() {
    let q = OutboundQueue::new(1);
    q.push(chat("stale notification")).unwrap();
    q.push(auth_failed("must land")).unwrap();
    assert_eq!(q.len(), 1);
}

#[tokio::test]
async fn pop_waits_for_a_frame_to_arrive() {
    let q = std::sync::Arc::new(OutboundQueue::new(4));
    let q2 = q.clone();
    let handle = tokio::spawn(async move { q2.pop().await });

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    q.push(chat("arrived")).unwrap();

    let frame = handle.await.unwrap();
    match frame {
        ServerFrame::Chat { text, .. } => assert_eq!(text, "arrived"),
        other => panic!("unexpected frame: {other:?}"),
    }
}
