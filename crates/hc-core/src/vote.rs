// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Vote entity.

use crate::id::{ProposalId, SessionId};
use crate::perspective::Perspective;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub session_ref: SessionId,
    pub choice: serde_json::Value,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub perspective: Option<Perspective>,
}

fn default_weight() -> f64 {
    1.0
}

#[cfg(test)]
#[path = "vote_tests.rs"]
mod tests;
