// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Diversity Tracker: rolling per-agent decision history,
//! perspective distribution, and rotation decisions.

use hc_core::{
    AgentId, Clock, DecisionRecord, Perspective, ALL_PERSPECTIVES, MAX_AGENT_HISTORY, MAX_GLOBAL_HISTORY,
    REQUIRED_BASELINE,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// How far back the "recent" window looks for auto-rotation's
/// agreement-rate trigger, and for `last_consensus_speed`.
const RECENT_WINDOW: usize = 5;
/// How long the aggregate metrics snapshot is cached before recompute.
const METRICS_CACHE_TTL: Duration = Duration::from_secs(5);
/// Auto-rotation fires if an agent hasn't rotated in this long.
const ROTATION_STALENESS: Duration = Duration::from_secs(30 * 60);
/// Auto-rotation fires if an agent's recent agreement rate exceeds this.
const ROTATION_AGREEMENT_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct DiversityMetrics {
    pub overall_diversity: f64,
    pub agreement_rate: f64,
    pub evidence_rate: f64,
    pub challenge_rate: f64,
    pub last_consensus_speed: usize,
    pub minority_perspectives_preserved: usize,
}

pub struct DiversityTracker<C: Clock> {
    clock: C,
    rng: Mutex<StdRng>,
    auto_rotate: bool,
    profiles: Mutex<HashMap<AgentId, Perspective>>,
    agent_history: Mutex<HashMap<AgentId, VecDeque<DecisionRecord>>>,
    global_history: Mutex<VecDeque<DecisionRecord>>,
    last_rotation: Mutex<HashMap<AgentId, Instant>>,
    cache: Mutex<Option<(Instant, DiversityMetrics)>>,
}

impl<C: Clock> DiversityTracker<C> {
    pub fn new(clock: C, auto_rotate: bool) -> Self {
        Self {
            clock,
            rng: Mutex::new(StdRng::from_entropy()),
            auto_rotate,
            profiles: Mutex::new(HashMap::new()),
            agent_history: Mutex::new(HashMap::new()),
            global_history: Mutex::new(VecDeque::new()),
            last_rotation: Mutex::new(HashMap::new()),
            cache: Mutex::new(None),
        }
    }

    /// Inject a deterministic RNG seed, for reproducible tests of
    /// random perspective assignment.
    pub fn with_seed(clock: C, auto_rotate: bool, seed: u64) -> Self {
        let tracker = Self::new(clock, auto_rotate);
        *tracker.rng.lock() = StdRng::seed_from_u64(seed);
        tracker
    }

    /// Register an agent with an explicit perspective, or assign one
    /// at random from the CSPRNG stream.
    pub fn register_agent(&self, agent_id: AgentId, profile: Option<Perspective>) -> Perspective {
        let chosen = profile.unwrap_or_else(|| self.random_perspective());
        self.profiles.lock().insert(agent_id.clone(), chosen);
        self.agent_history.lock().entry(agent_id).or_default();
        self.invalidate_cache();
        chosen
    }

    pub fn perspective_of(&self, agent_id: &AgentId) -> Option<Perspective> {
        self.profiles.lock().get(agent_id).copied()
    }

    /// True iff `agent_id`'s perspective has no other current holder.
    pub fn is_sole_bearer(&self, agent_id: &AgentId) -> bool {
        let Some(perspective) = self.perspective_of(agent_id) else { return false };
        *self.perspective_counts().get(&perspective).unwrap_or(&0) <= 1
    }

    /// The agent's bounded rolling decision history, oldest first.
    pub fn history_for(&self, agent_id: &AgentId) -> Vec<DecisionRecord> {
        self.agent_history.lock().get(agent_id).map(|d| d.iter().cloned().collect()).unwrap_or_default()
    }

    /// The last `n` entries of the global rolling history, oldest first.
    /// Used by callers (the hub's chat path) to build the analyzer's
    /// `recent_context` window without exposing the whole history.
    pub fn recent_history(&self, n: usize) -> Vec<DecisionRecord> {
        let global = self.global_history.lock();
        let len = global.len();
        global.iter().skip(len.saturating_sub(n)).cloned().collect()
    }

    /// Assignment policy for a newly joining agent (spec §4.6): an
    /// explicit profile wins outright; otherwise fill whichever of the
    /// required baseline (SKEPTIC, ANALYTICAL) is still absent, falling
    /// back to the single rarest perspective currently represented.
    pub fn assign_new_agent(&self, agent_id: AgentId, explicit: Option<Perspective>) -> Perspective {
        if explicit.is_some() {
            return self.register_agent(agent_id, explicit);
        }

        let counts = self.perspective_counts();
        for baseline in REQUIRED_BASELINE {
            if !counts.contains_key(&baseline) {
                return self.register_agent(agent_id, Some(baseline));
            }
        }

        let rarest = ALL_PERSPECTIVES
            .into_iter()
            .min_by_key(|p| *counts.get(p).unwrap_or(&0));
        self.register_agent(agent_id, rarest)
    }

    fn random_perspective(&self) -> Perspective {
        let idx = self.rng.lock().gen_range(0..ALL_PERSPECTIVES.len());
        ALL_PERSPECTIVES[idx]
    }

    /// Draw a weighted coin flip off the same RNG stream used for
    /// perspective assignment, so the enforcer's probabilistic checks
    /// share one seed rather than spinning up a second generator.
    pub fn gen_bool(&self, probability: f64) -> bool {
        self.rng.lock().gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Append a decision to both the per-agent and global rolling
    /// history, invalidate the metrics cache, and auto-rotate the
    /// agent's perspective if configured and due.
    pub fn record_decision(&self, record: DecisionRecord) {
        let agent_id = record.agent.clone();

        {
            let mut agent_history = self.agent_history.lock();
            let deque = agent_history.entry(agent_id.clone()).or_default();
            deque.push_back(record.clone());
            while deque.len() > MAX_AGENT_HISTORY {
                deque.pop_front();
            }
        }
        {
            let mut global = self.global_history.lock();
            global.push_back(record);
            while global.len() > MAX_GLOBAL_HISTORY {
                global.pop_front();
            }
        }
        self.invalidate_cache();

        if self.auto_rotate && self.rotation_is_due(&agent_id) {
            self.rotate_perspective(&agent_id);
        }
    }

    fn rotation_is_due(&self, agent_id: &AgentId) -> bool {
        let stale = match self.last_rotation.lock().get(agent_id) {
            Some(last) => self.clock.now().saturating_duration_since(*last) > ROTATION_STALENESS,
            None => true,
        };
        stale || self.recent_agreement_rate(agent_id) > ROTATION_AGREEMENT_THRESHOLD
    }

    fn recent_agreement_rate(&self, agent_id: &AgentId) -> f64 {
        let history = self.agent_history.lock();
        let Some(deque) = history.get(agent_id) else { return 0.0 };
        let window: Vec<&DecisionRecord> = deque.iter().rev().take(RECENT_WINDOW).collect();
        if window.is_empty() {
            return 0.0;
        }
        let agreed = window.iter().filter(|r| r.agreed_with_majority).count();
        agreed as f64 / window.len() as f64
    }

    /// Pick an underrepresented perspective (current holder count less
    /// than half of the fair share), falling back to a random pick.
    pub fn rotate_perspective(&self, agent_id: &AgentId) -> Perspective {
        let counts = self.perspective_counts();
        let total_agents = self.profiles.lock().len().max(1);
        let fair_share = (total_agents as f64 / ALL_PERSPECTIVES.len() as f64).ceil() * 0.5;

        let underrepresented: Vec<Perspective> = ALL_PERSPECTIVES
            .into_iter()
            .filter(|p| (*counts.get(p).unwrap_or(&0) as f64) < fair_share)
            .collect();

        let chosen = if underrepresented.is_empty() {
            self.random_perspective()
        } else {
            let idx = self.rng.lock().gen_range(0..underrepresented.len());
            underrepresented[idx]
        };

        self.profiles.lock().insert(agent_id.clone(), chosen);
        self.last_rotation.lock().insert(agent_id.clone(), self.clock.now());
        self.invalidate_cache();
        chosen
    }

    fn perspective_counts(&self) -> HashMap<Perspective, usize> {
        let mut counts = HashMap::new();
        for perspective in self.profiles.lock().values() {
            *counts.entry(*perspective).or_insert(0) += 1;
        }
        counts
    }

    fn invalidate_cache(&self) {
        *self.cache.lock() = None;
    }

    /// Aggregate diversity metrics, cached for [`METRICS_CACHE_TTL`].
    pub fn get_diversity_metrics(&self) -> DiversityMetrics {
        if let Some((at, cached)) = self.cache.lock().as_ref() {
            if self.clock.now().saturating_duration_since(*at) < METRICS_CACHE_TTL {
                return cached.clone();
            }
        }

        let profiles = self.profiles.lock();
        let total_agents = profiles.len().max(1);
        let distinct: std::collections::HashSet<Perspective> = profiles.values().copied().collect();
        let overall_diversity = distinct.len() as f64 / total_agents as f64;

        let counts = {
            let mut counts = HashMap::new();
            for p in profiles.values() {
                *counts.entry(*p).or_insert(0usize) += 1;
            }
            counts
        };
        let minority_perspectives_preserved = counts.values().filter(|c| **c == 1).count();
        drop(profiles);

        let global = self.global_history.lock();
        let window: Vec<&DecisionRecord> = global.iter().collect();
        let agreement_rate = rate(&window, |r| r.agreed_with_majority);
        let evidence_rate = rate(&window, |r| r.evidence_provided);
        let challenge_rate = rate(&window, |r| r.challenged_assumptions);

        let last_consensus_speed = global
            .iter()
            .rev()
            .take(RECENT_WINDOW)
            .take_while(|r| r.agreed_with_majority)
            .count();

        let metrics = DiversityMetrics {
            overall_diversity,
            agreement_rate,
            evidence_rate,
            challenge_rate,
            last_consensus_speed,
            minority_perspectives_preserved,
        };

        *self.cache.lock() = Some((self.clock.now(), metrics.clone()));
        metrics
    }
}

fn rate(records: &[&DecisionRecord], pred: impl Fn(&DecisionRecord) -> bool) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().filter(|r| pred(r)).count() as f64 / records.len() as f64
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
