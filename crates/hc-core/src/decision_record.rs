// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Append-only decision history used by the diversity tracker.

use crate::id::AgentId;
use crate::perspective::Perspective;
use serde::{Deserialize, Serialize};

/// Bound on the per-agent rolling decision history.
pub const MAX_AGENT_HISTORY: usize = 20;
/// Bound on the global rolling decision history.
pub const MAX_GLOBAL_HISTORY: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub timestamp_ms: u64,
    pub agent: AgentId,
    pub decision: String,
    pub perspective: Perspective,
    pub agreed_with_majority: bool,
    pub evidence_provided: bool,
    pub challenged_assumptions: bool,
}

#[cfg(test)]
#[path = "decision_record_tests.rs"]
mod tests;
