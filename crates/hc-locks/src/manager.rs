// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Lock Manager: exactly one agent wins the right to claim a task
//! at a given instant, via a transient lock followed by a durable claim.

use hc_core::{
    AgentId, Claim, ClaimStatus, Clock, IdGen, Lock, LockSnapshotEntry, LockStatus, LockToken,
    TaskId,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::LockError;

/// In-memory lock and claim tables, backed by best-effort JSON snapshots.
pub struct LockManager<C: Clock, G: IdGen> {
    clock: C,
    id_gen: G,
    ttl: Duration,
    locks: Mutex<HashMap<TaskId, Lock>>,
    claims: Mutex<HashMap<TaskId, Claim>>,
    locks_path: Option<PathBuf>,
    claims_path: Option<PathBuf>,
}

impl<C: Clock, G: IdGen> LockManager<C, G> {
    pub fn new(clock: C, id_gen: G, ttl: Duration) -> Self {
        Self {
            clock,
            id_gen,
            ttl,
            locks: Mutex::new(HashMap::new()),
            claims: Mutex::new(HashMap::new()),
            locks_path: None,
            claims_path: None,
        }
    }

    /// Attach persistence paths and load any prior state, discarding
    /// locks that are already expired.
    pub fn with_persistence(mut self, locks_path: PathBuf, claims_path: PathBuf) -> Self {
        if let Ok(Some(rows)) = hc_storage::load_if_present::<Vec<LockSnapshotEntry>>(&locks_path) {
            let now_ms = self.clock.epoch_ms();
            let now = self.clock.now();
            let mut locks = self.locks.lock();
            for row in rows {
                if row.expires_at_ms <= now_ms {
                    continue;
                }
                let remaining_ms = row.expires_at_ms - now_ms;
                locks.insert(
                    row.task_id.clone(),
                    Lock {
                        task_id: row.task_id,
                        locked_by: row.locked_by,
                        locked_at: now,
                        expires_at: now + Duration::from_millis(remaining_ms),
                        lock_token: row.lock_token,
                    },
                );
            }
        }
        if let Ok(Some(rows)) = hc_storage::load_if_present::<Vec<Claim>>(&claims_path) {
            let mut claims = self.claims.lock();
            for claim in rows {
                claims.insert(claim.task_id.clone(), claim);
            }
        }
        self.locks_path = Some(locks_path);
        self.claims_path = Some(claims_path);
        self
    }

    /// Acquire or idempotently refresh a lock on `task_id` for `agent_id`.
    pub fn acquire(&self, task_id: &TaskId, agent_id: &AgentId) -> Option<LockToken> {
        let now = self.clock.now();
        let mut locks = self.locks.lock();

        let token = match locks.get(task_id) {
            Some(existing) if !existing.is_expired(now) && existing.locked_by == *agent_id => {
                existing.lock_token.clone()
            }
            Some(existing) if !existing.is_expired(now) => {
                debug!(task_id = %task_id, holder = %existing.locked_by, "lock held by another agent");
                return None;
            }
            _ => LockToken::from(format!("lock-{}", self.id_gen.next())),
        };

        locks.insert(
            task_id.clone(),
            Lock {
                task_id: task_id.clone(),
                locked_by: agent_id.clone(),
                locked_at: now,
                expires_at: now + self.ttl,
                lock_token: token.clone(),
            },
        );
        drop(locks);
        self.persist_locks();
        Some(token)
    }

    /// Release a lock if `lock_token` matches the held token.
    pub fn release(&self, task_id: &TaskId, lock_token: &LockToken) -> bool {
        let mut locks = self.locks.lock();
        let released = match locks.get(task_id) {
            Some(lock) if lock.lock_token == *lock_token => {
                locks.remove(task_id);
                true
            }
            _ => false,
        };
        drop(locks);
        if released {
            self.persist_locks();
        }
        released
    }

    /// Turn a held lock into a durable claim. Releases the lock on success.
    pub fn claim(
        &self,
        task_id: &TaskId,
        agent_id: &AgentId,
        lock_token: &LockToken,
    ) -> Result<(), LockError> {
        {
            let locks = self.locks.lock();
            match locks.get(task_id) {
                Some(lock)
                    if lock.locked_by == *agent_id
                        && lock.lock_token == *lock_token
                        && !lock.is_expired(self.clock.now()) => {}
                _ => return Err(LockError::NotHeld),
            }
        }

        let mut claims = self.claims.lock();
        if let Some(existing) = claims.get(task_id) {
            if !existing.status.is_completed() {
                return Err(LockError::AlreadyClaimed);
            }
        }
        claims.insert(
            task_id.clone(),
            Claim::new(task_id.clone(), agent_id.clone(), self.clock.epoch_ms()),
        );
        drop(claims);
        self.persist_claims();

        self.locks.lock().remove(task_id);
        self.persist_locks();
        Ok(())
    }

    /// Update a claim's status; only the claiming agent may do so.
    pub fn update_status(&self, task_id: &TaskId, agent_id: &AgentId, status: ClaimStatus) -> bool {
        let mut claims = self.claims.lock();
        let updated = match claims.get_mut(task_id) {
            Some(claim) if claim.agent == *agent_id => {
                claim.status = status;
                true
            }
            _ => false,
        };
        drop(claims);
        if updated {
            self.persist_claims();
        }
        updated
    }

    /// True iff no live lock and no non-completed claim exist for `task_id`.
    pub fn is_available(&self, task_id: &TaskId) -> bool {
        let now = self.clock.now();
        let no_live_lock = self
            .locks
            .lock()
            .get(task_id)
            .map(|lock| lock.is_expired(now))
            .unwrap_or(true);
        let no_open_claim = self
            .claims
            .lock()
            .get(task_id)
            .map(|claim| claim.status.is_completed())
            .unwrap_or(true);
        no_live_lock && no_open_claim
    }

    pub fn lock_status(&self, task_id: &TaskId) -> LockStatus {
        let now = self.clock.now();
        match self.locks.lock().get(task_id) {
            Some(lock) if !lock.is_expired(now) => LockStatus {
                locked: true,
                owner: Some(lock.locked_by.clone()),
                expires_in_ms: Some(lock.expires_at.saturating_duration_since(now).as_millis() as u64),
            },
            _ => LockStatus {
                locked: false,
                owner: None,
                expires_in_ms: None,
            },
        }
    }

    pub fn claim_for(&self, task_id: &TaskId) -> Option<Claim> {
        self.claims.lock().get(task_id).cloned()
    }

    /// Drop every expired lock, returning the task ids that were swept.
    /// Intended to be called from a periodic sweeper task.
    pub fn sweep_expired(&self) -> Vec<TaskId> {
        let now = self.clock.now();
        let mut locks = self.locks.lock();
        let expired: Vec<TaskId> = locks
            .iter()
            .filter(|(_, lock)| lock.is_expired(now))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            locks.remove(id);
        }
        drop(locks);
        if !expired.is_empty() {
            self.persist_locks();
        }
        expired
    }

    fn persist_locks(&self) {
        let Some(path) = &self.locks_path else { return };
        let now = self.clock.now();
        let now_ms = self.clock.epoch_ms();
        let rows: Vec<LockSnapshotEntry> = self
            .locks
            .lock()
            .values()
            .map(|lock| LockSnapshotEntry {
                task_id: lock.task_id.clone(),
                locked_by: lock.locked_by.clone(),
                locked_at_ms: now_ms
                    .saturating_sub(now.saturating_duration_since(lock.locked_at).as_millis() as u64),
                expires_at_ms: now_ms + lock.expires_at.saturating_duration_since(now).as_millis() as u64,
                lock_token: lock.lock_token.clone(),
            })
            .collect();
        if let Err(e) = hc_storage::write_atomic(path, &rows) {
            warn!(error = %e, "failed to persist task locks");
        }
    }

    fn persist_claims(&self) {
        let Some(path) = &self.claims_path else { return };
        let rows: Vec<Claim> = self.claims.lock().values().cloned().collect();
        if let Err(e) = hc_storage::write_atomic(path, &rows) {
            warn!(error = %e, "failed to persist task claims");
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
