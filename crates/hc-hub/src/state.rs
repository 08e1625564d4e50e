// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hub's shared application state: every long-lived component the
//! dispatcher and WebSocket handlers reach into, wired together once at
//! startup.

use std::sync::Arc;

use hc_core::{Clock, SystemClock, UuidIdGen};
use hc_diversity::DiversityEnforcer;
use hc_identity::IdentityStore;
use hc_orchestration::Engine;
use hc_storage::{Config, Workspace};

use crate::hub::ConnectionHub;

/// Concrete engine instantiation used by the running server: real
/// wall-clock time and UUID-based ids. Tests use `Engine<FakeClock,
/// SequentialIdGen>` directly against the orchestration crate instead
/// of going through `HubState`.
pub type ProdEngine = Engine<SystemClock, UuidIdGen>;

/// Everything the dispatcher needs, shared across every connection via
/// an `Arc<HubState>`.
pub struct HubState {
    pub identities: IdentityStore,
    pub engine: Arc<ProdEngine>,
    pub diversity: DiversityEnforcer<SystemClock>,
    pub hub: ConnectionHub,
    pub workspace: Workspace,
    pub config: Config,
    pub clock: SystemClock,
}

impl HubState {
    pub fn new(workspace: Workspace, config: Config) -> Self {
        let clock = SystemClock;
        let identities = IdentityStore::new().with_persistence(workspace.identities_path());
        let engine = Arc::new(Engine::new(clock.clone(), UuidIdGen, &config).with_persistence(workspace.clone()));
        let tracker = hc_diversity::DiversityTracker::new(clock.clone(), config.diversity.auto_rotate);
        let diversity = DiversityEnforcer::new(config.diversity.clone(), tracker);

        Self {
            identities,
            engine,
            diversity,
            hub: ConnectionHub::new(),
            workspace,
            config,
            clock,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// Agents the engine still considers connected (not offline) —
    /// used to size voting quorum per spec §4.3.
    pub fn non_offline_agent_count(&self) -> usize {
        self.engine
            .list_agents()
            .iter()
            .filter(|a| !matches!(a.status, hc_orchestration::AgentStatus::Offline))
            .count()
    }
}
