// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Server-generated corrective instructions issued when diversity
//! requirements are unmet.

use crate::id::AgentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionKind {
    ForceDisagreement,
    RequestEvidence,
    RotatePerspective,
    AddPerspective,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    pub kind: InterventionKind,
    pub reason: String,
    pub target: AgentId,
    pub required_action: String,
    pub deadline_ms: u64,
}

#[cfg(test)]
#[path = "intervention_tests.rs"]
mod tests;
