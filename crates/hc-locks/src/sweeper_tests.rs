// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hc_core::{AgentId, SequentialIdGen, SystemClock, TaskId};
use parking_lot::Mutex;
use std::time::Duration;

#[tokio::test]
async fn sweeper_drops_expired_locks_and_notifies() {
    let manager = Arc::new(LockManager::new(
        SystemClock,
        SequentialIdGen::new("tok"),
        Duration::from_millis(30),
    ));
    manager
        .acquire(&TaskId::new("t1"), &AgentId::new("a1"))
        .expect("lock should be free");

    let seen: Arc<Mutex<Vec<TaskId>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let _handle = spawn_sweeper(Arc::clone(&manager), Duration::from_millis(10), move |expired| {
        seen_clone.lock().extend(expired);
    });

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(seen.lock().as_slice(), &[TaskId::new("t1")]);
    assert!(manager.is_available(&TaskId::new("t1")));
}

#[tokio::test]
async fn sweeper_ignores_refreshed_locks() {
    let manager = Arc::new(LockManager::new(
        SystemClock,
        SequentialIdGen::new("tok"),
        Duration::from_millis(60),
    ));
    let task = TaskId::new("t1");
    let agent = AgentId::new("a1");
    manager.acquire(&task, &agent).expect("lock should be free");

    let seen: Arc<Mutex<Vec<TaskId>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let _handle = spawn_sweeper(Arc::clone(&manager), Duration::from_millis(10), move |expired| {
        seen_clone.lock().extend(expired);
    });

    // Refresh the lock twice, faster than the TTL, then stop refreshing.
    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.acquire(&task, &agent).expect("same agent re-entry");
    }
    assert!(seen.lock().is_empty(), "refreshed lock must not be swept");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(seen.lock().as_slice(), &[task]);
}
