// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vote weighting and conflict/decision resolution, per spec §4.6's
//! weighting table: diverse, evidenced, on-point contributions count
//! for more than a bare majority.

use std::collections::{HashMap, HashSet};

use hc_core::{Edit, Perspective, Vote};

/// Weight applied to one vote, folding in the perspective-diversity and
/// evidence bonuses. `is_sole_perspective_bearer` is true when this
/// vote's perspective has no other holder among the connected agents.
pub fn vote_weight(
    perspective: Option<Perspective>,
    is_sole_perspective_bearer: bool,
    evidence: &[String],
    skeptic_identifies_risk: bool,
) -> f64 {
    let mut weight = 1.0;
    if is_sole_perspective_bearer {
        weight *= 1.5;
    }
    if !evidence.is_empty() {
        weight *= 1.2;
    }
    if perspective == Some(Perspective::Analytical) && evidence.len() >= 3 {
        weight *= 1.1;
    }
    if perspective == Some(Perspective::Skeptic) && skeptic_identifies_risk {
        weight *= 1.1;
    }
    weight
}

/// One candidate edit competing to resolve a conflict window, carrying
/// the perspective and confidence of the agent that proposed it.
#[derive(Debug, Clone)]
pub struct EditCandidate {
    pub edit: Edit,
    pub perspective: Option<Perspective>,
    pub confidence: f64,
}

/// Resolve a set of conflicting edits to the highest weighted-confidence
/// candidate. Weight is the perspective's `resolution_weight`, boosted
/// by 20% per distinct perspective represented among the candidates.
pub fn resolve_conflict(candidates: &[EditCandidate]) -> Option<Edit> {
    if candidates.is_empty() {
        return None;
    }
    let distinct_perspectives = candidates.iter().filter_map(|c| c.perspective).collect::<HashSet<_>>().len();
    let diversity_bonus = 1.0 + 0.2 * distinct_perspectives as f64;

    candidates
        .iter()
        .max_by(|a, b| {
            let score_a = weighted_score(a, diversity_bonus);
            let score_b = weighted_score(b, diversity_bonus);
            score_a.partial_cmp(&score_b).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| c.edit.clone())
}

fn weighted_score(candidate: &EditCandidate, diversity_bonus: f64) -> f64 {
    let perspective_weight = candidate.perspective.map(Perspective::resolution_weight).unwrap_or(1.0);
    perspective_weight * diversity_bonus * candidate.confidence
}

/// Result of resolving competing votes on a proposal to a single choice.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionResolution {
    pub choice: serde_json::Value,
    /// Fraction of all nine perspectives represented among the votes
    /// for the winning choice.
    pub diversity_score: f64,
}

/// Group votes by `choice`, score each group, and return the winner.
///
/// Per-group score is the sum, over that group's votes, of
/// `weight * (1 + 0.5 * distinct_perspectives / 9 + 0.3 * evidence_ratio)`,
/// where `evidence_ratio` is the fraction of the group's votes that
/// attached non-empty evidence.
pub fn resolve_decision(votes: &[Vote]) -> Option<DecisionResolution> {
    if votes.is_empty() {
        return None;
    }

    let mut groups: HashMap<String, Vec<&Vote>> = HashMap::new();
    for vote in votes {
        let key = serde_json::to_string(&vote.choice).unwrap_or_default();
        groups.entry(key).or_default().push(vote);
    }

    let mut best: Option<(f64, f64, &Vote)> = None;
    for group in groups.values() {
        let distinct_perspectives = group.iter().filter_map(|v| v.perspective).collect::<HashSet<_>>().len();
        let with_evidence = group.iter().filter(|v| !v.evidence.is_empty()).count();
        let evidence_ratio = with_evidence as f64 / group.len() as f64;
        let multiplier = 1.0 + 0.5 * (distinct_perspectives as f64 / 9.0) + 0.3 * evidence_ratio;
        let score: f64 = group.iter().map(|v| v.weight * multiplier).sum();
        let diversity_score = distinct_perspectives as f64 / 9.0;

        let representative = group[0];
        if best.as_ref().map(|(s, ..)| score > *s).unwrap_or(true) {
            best = Some((score, diversity_score, representative));
        }
    }

    best.map(|(_, diversity_score, representative)| DecisionResolution {
        choice: representative.choice.clone(),
        diversity_score,
    })
}

#[cfg(test)]
#[path = "resolution_tests.rs"]
mod tests;
