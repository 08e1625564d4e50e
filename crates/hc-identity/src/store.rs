// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Identity Store: a persistent mapping from display name to
//! durable agent identity, with append-only session/contribution
//! metrics and bearer-token authentication.

use hc_core::{AgentId, Identity, Perspective};
use parking_lot::Mutex;
use rand::RngCore;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::IdentityError;

/// Fields a client submits on every new connection's `auth` frame.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub display_name: String,
    pub auth_token: Option<String>,
    pub role: String,
    pub perspective: Option<Perspective>,
    /// Set when the caller explicitly wants a brand new identity,
    /// rejecting the request outright if the name is already taken
    /// rather than silently authenticating as the existing identity.
    pub new_agent: bool,
}

/// What the store reports back on successful authentication, enough to
/// build an `auth-success` frame.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub identity: Identity,
    pub is_returning: bool,
    /// Present only when a token was freshly minted this call; the
    /// client is expected to persist it for future reconnects.
    pub issued_token: Option<String>,
}

/// Durable identity records, keyed by display name, with a secondary
/// `agent_id` index for role switches and lookups after auth.
pub struct IdentityStore {
    by_name: Mutex<HashMap<String, Identity>>,
    path: Option<PathBuf>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self {
            by_name: Mutex::new(HashMap::new()),
            path: None,
        }
    }

    /// Attach a persistence path and load any prior state.
    pub fn with_persistence(mut self, path: PathBuf) -> Self {
        if let Ok(Some(rows)) = hc_storage::load_if_present::<HashMap<String, Identity>>(&path) {
            *self.by_name.lock() = rows;
        }
        self.path = Some(path);
        self
    }

    /// Explicit registration, distinct from `authenticate`: fails if the
    /// display name is already in use by anyone.
    pub fn register(&self, display_name: String, role: String, now_ms: u64) -> Result<Identity, IdentityError> {
        let mut table = self.by_name.lock();
        if table.contains_key(&display_name) {
            return Err(IdentityError::NameTaken);
        }
        let identity = new_identity(display_name.clone(), role, None, now_ms);
        table.insert(display_name, identity.clone());
        drop(table);
        self.persist();
        info!(agent_id = %identity.agent_id, "registered new identity");
        Ok(identity)
    }

    /// Authenticate (or first-time-join) a connection.
    ///
    /// If `display_name` is unseen, a fresh identity is minted and its
    /// token returned to the caller. If seen, `auth_token` must match;
    /// any mismatch (including an absent token for an existing name,
    /// or `new_agent: true` colliding with an existing name) fails with
    /// [`IdentityError::TokenMismatch`] / [`IdentityError::NameTaken`].
    pub fn authenticate(&self, req: AuthRequest, now_ms: u64) -> Result<AuthOutcome, IdentityError> {
        let mut table = self.by_name.lock();
        match table.get_mut(&req.display_name) {
            Some(identity) => {
                if req.new_agent {
                    return Err(IdentityError::NameTaken);
                }
                match &req.auth_token {
                    Some(token) if *token == identity.auth_token => {
                        identity.role = req.role;
                        if req.perspective.is_some() {
                            identity.perspective = req.perspective;
                        }
                        identity.record_join(now_ms);
                        let snapshot = identity.clone();
                        drop(table);
                        self.persist();
                        Ok(AuthOutcome {
                            identity: snapshot,
                            is_returning: true,
                            issued_token: None,
                        })
                    }
                    _ => Err(IdentityError::TokenMismatch),
                }
            }
            None => {
                let mut identity = new_identity(req.display_name.clone(), req.role, req.perspective, now_ms);
                identity.record_join(now_ms);
                let token = identity.auth_token.clone();
                table.insert(req.display_name, identity.clone());
                drop(table);
                self.persist();
                info!(agent_id = %identity.agent_id, "first-time join, issued new auth token");
                Ok(AuthOutcome {
                    identity,
                    is_returning: false,
                    issued_token: Some(token),
                })
            }
        }
    }

    /// Append a role change for the identity owning `agent_id`.
    pub fn switch_role(&self, agent_id: &AgentId, new_role: String, now_ms: u64) -> Result<Identity, IdentityError> {
        let mut table = self.by_name.lock();
        let identity = table
            .values_mut()
            .find(|i| i.agent_id == *agent_id)
            .ok_or(IdentityError::NotFound)?;
        identity.switch_role(new_role, now_ms);
        let snapshot = identity.clone();
        drop(table);
        self.persist();
        Ok(snapshot)
    }

    /// Record a contribution (message, edit, vote) against the owning
    /// identity's append-only metrics.
    pub fn record_contribution(&self, agent_id: &AgentId, now_ms: u64) {
        let mut table = self.by_name.lock();
        if let Some(identity) = table.values_mut().find(|i| i.agent_id == *agent_id) {
            identity.record_contribution(now_ms);
        }
        drop(table);
        self.persist();
    }

    pub fn find_by_agent_id(&self, agent_id: &AgentId) -> Option<Identity> {
        self.by_name.lock().values().find(|i| i.agent_id == *agent_id).cloned()
    }

    pub fn find_by_name(&self, display_name: &str) -> Option<Identity> {
        self.by_name.lock().get(display_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_name.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self) {
        let Some(path) = &self.path else { return };
        let snapshot = self.by_name.lock().clone();
        if let Err(e) = hc_storage::write_atomic(path, &snapshot) {
            warn!(error = %e, "failed to persist identities");
        }
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn new_identity(display_name: String, role: String, perspective: Option<Perspective>, now_ms: u64) -> Identity {
    let agent_id = AgentId::new(format!("agent-{}", hc_core::short_random()));
    let token = generate_token();
    let mut identity = Identity::new(agent_id, display_name, token, role, now_ms);
    identity.perspective = perspective;
    identity
}

/// 32 bytes of CSPRNG, hex-encoded: 256 bits, 64 hex characters.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
