// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub-wide configuration, loaded from `config.json` at startup with
//! sane defaults for every field.

use serde::{Deserialize, Serialize};

/// Task assignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmMode {
    /// A human or external controller assigns every task explicitly;
    /// the engine never auto-assigns.
    Centralized,
    /// The engine auto-assigns newly created tasks to compatible idle
    /// agents.
    Distributed,
}

impl Default for SwarmMode {
    fn default() -> Self {
        SwarmMode::Distributed
    }
}

/// Diversity-enforcement thresholds and toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityConfig {
    /// Master toggle; when false the middleware allows every contribution.
    pub enabled: bool,
    /// In strict mode, the most severe intervention rejects the
    /// contribution outright rather than merely annotating it.
    pub strict_mode: bool,
    /// Below this many connected peers, diversity checks are skipped.
    pub minimum_agents_for_diversity: usize,
    /// Floor for `overall_diversity` before ADD_PERSPECTIVE fires.
    pub minimum_diversity: f64,
    /// Floor for `evidence_quality` on decision messages before
    /// REQUEST_EVIDENCE fires.
    pub evidence_quality_threshold: f64,
    /// Fraction of decisions expected to involve genuine disagreement
    /// before the disagreement-quota check starts forcing it.
    pub disagreement_quota: f64,
    /// `last_consensus_speed` above this many straight agreements trips
    /// the consensus-speed check.
    pub max_consensus_speed: usize,
    /// Whether the tracker rotates an agent's perspective automatically
    /// once it's gone stale or started agreeing too readily.
    pub auto_rotate: bool,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_mode: false,
            minimum_agents_for_diversity: 3,
            minimum_diversity: 0.4,
            evidence_quality_threshold: 0.5,
            disagreement_quota: 0.3,
            max_consensus_speed: 4,
            auto_rotate: true,
        }
    }
}

/// Top-level hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long a task lock is held before it is eligible for expiry.
    pub lock_ttl_secs: u64,
    /// How often the lock sweeper scans for expired locks.
    pub lock_sweep_interval_secs: u64,
    /// How long a task may sit in-progress before the engine reclaims it.
    pub task_timeout_secs: u64,
    /// Window within which two edits to the same file by different
    /// sessions are flagged as conflicting.
    pub edit_conflict_window_secs: u64,
    /// Assignment strategy for newly created tasks.
    pub swarm_mode: SwarmMode,
    /// Diversity-enforcement thresholds.
    pub diversity: DiversityConfig,
    /// Bound on a session's outbound frame queue before backpressure
    /// kicks in.
    pub outbound_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_ttl_secs: 5,
            lock_sweep_interval_secs: 1,
            task_timeout_secs: 300,
            edit_conflict_window_secs: 5,
            swarm_mode: SwarmMode::default(),
            diversity: DiversityConfig::default(),
            outbound_queue_capacity: 256,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults
    /// for any field the file omits.
    pub fn load(path: &std::path::Path) -> Result<Self, crate::atomic::StorageError> {
        match crate::atomic::load_if_present(path)? {
            Some(config) => Ok(config),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
