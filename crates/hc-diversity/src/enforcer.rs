// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Diversity Enforcer: the gate every chat message or decision
//! passes through before it lands, running the Analyzer and the five
//! checks from spec §4.6 against the Tracker's live metrics.

use hc_core::{AgentId, Clock, DecisionRecord, Intervention, InterventionKind};
use hc_storage::DiversityConfig;

use crate::analyzer::{analyze, AnalysisResult, ContextItem, Severity};
use crate::tracker::DiversityTracker;

/// Milliseconds an agent is given to comply with a non-rejecting
/// intervention before a follow-up would be warranted.
const INTERVENTION_DEADLINE_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionKind {
    Message,
    Decision,
}

pub struct ContributionRequest<'a> {
    pub agent_id: AgentId,
    pub content: &'a str,
    pub kind: ContributionKind,
    pub connected_peers: usize,
    pub recent_context: &'a [ContextItem],
    /// Whether this contribution matches the emerging majority, as
    /// judged by the caller. The analyzer only sees text; the caller
    /// (orchestration) knows the live vote/consensus state.
    pub agreed_with_majority: bool,
}

#[derive(Debug, Clone)]
pub struct ContributionVerdict {
    pub allowed: bool,
    pub intervention: Option<Intervention>,
    /// A short prefix the caller should attach to the delivered content
    /// when allowed-with-annotation (non-strict mode).
    pub content_modifier: Option<String>,
    pub analysis: AnalysisResult,
}

pub struct DiversityEnforcer<C: Clock> {
    config: DiversityConfig,
    tracker: DiversityTracker<C>,
}

impl<C: Clock> DiversityEnforcer<C> {
    pub fn new(config: DiversityConfig, tracker: DiversityTracker<C>) -> Self {
        Self { config, tracker }
    }

    pub fn tracker(&self) -> &DiversityTracker<C> {
        &self.tracker
    }

    pub fn config(&self) -> &DiversityConfig {
        &self.config
    }

    /// Run the full gate: analyze, check, pick the most severe
    /// intervention (if any), and record the decision into the
    /// tracker's rolling history when the contribution lands.
    pub fn check_contribution(&self, req: ContributionRequest<'_>, now_ms: u64) -> ContributionVerdict {
        let analysis = analyze(req.content, req.recent_context);

        if !self.config.enabled || req.connected_peers < self.config.minimum_agents_for_diversity {
            self.record(&req, &analysis, now_ms);
            return ContributionVerdict {
                allowed: true,
                intervention: None,
                content_modifier: None,
                analysis,
            };
        }

        let metrics = self.tracker.get_diversity_metrics();
        let mut candidates = Vec::new();
        candidates.extend(self.check_echo_chamber(&req, &analysis, now_ms));
        candidates.extend(self.check_disagreement_quota(&req, &metrics, now_ms));
        candidates.extend(self.check_evidence(&req, &analysis, now_ms));
        candidates.extend(self.check_perspective_diversity(&req, &metrics, now_ms));
        candidates.extend(self.check_consensus_speed(&req, &metrics, now_ms));

        let intervention = pick_most_severe(candidates);

        match intervention {
            None => {
                self.record(&req, &analysis, now_ms);
                ContributionVerdict {
                    allowed: true,
                    intervention: None,
                    content_modifier: None,
                    analysis,
                }
            }
            Some(intervention) if self.config.strict_mode => ContributionVerdict {
                allowed: false,
                intervention: Some(intervention),
                content_modifier: None,
                analysis,
            },
            Some(intervention) => {
                self.record(&req, &analysis, now_ms);
                let modifier = format!("[diversity: {}] {}", kind_label(intervention.kind), intervention.required_action);
                ContributionVerdict {
                    allowed: true,
                    intervention: Some(intervention),
                    content_modifier: Some(modifier),
                    analysis,
                }
            }
        }
    }

    fn check_echo_chamber(
        &self,
        req: &ContributionRequest<'_>,
        analysis: &AnalysisResult,
        now_ms: u64,
    ) -> Option<Intervention> {
        let worst = analysis.worst_echo_pattern()?;
        if worst.severity != Severity::High {
            return None;
        }
        Some(self.intervention(
            req.agent_id.clone(),
            InterventionKind::ForceDisagreement,
            format!("echo pattern detected: {}", worst.detail),
            "state a concrete counterpoint or risk before continuing".to_string(),
            now_ms,
        ))
    }

    /// Fires probabilistically, not deterministically: per spec §4.6 the
    /// odds of an intervention equal the deficit itself, so a quota
    /// that's barely missed nags rarely and one that's badly missed
    /// nags almost every time.
    fn check_disagreement_quota(
        &self,
        req: &ContributionRequest<'_>,
        metrics: &crate::tracker::DiversityMetrics,
        now_ms: u64,
    ) -> Option<Intervention> {
        let disagreement_rate = 1.0 - metrics.agreement_rate;
        let deficit = self.config.disagreement_quota - disagreement_rate;
        if deficit <= 0.1 {
            return None;
        }
        if !self.tracker.gen_bool(deficit) {
            return None;
        }
        Some(self.intervention(
            req.agent_id.clone(),
            InterventionKind::ForceDisagreement,
            format!(
                "disagreement rate {disagreement_rate:.2} is below the {:.2} quota",
                self.config.disagreement_quota
            ),
            "raise an objection or alternative before agreeing".to_string(),
            now_ms,
        ))
    }

    fn check_evidence(
        &self,
        req: &ContributionRequest<'_>,
        analysis: &AnalysisResult,
        now_ms: u64,
    ) -> Option<Intervention> {
        if req.kind != ContributionKind::Decision {
            return None;
        }
        if analysis.evidence_quality >= self.config.evidence_quality_threshold {
            return None;
        }
        Some(self.intervention(
            req.agent_id.clone(),
            InterventionKind::RequestEvidence,
            format!("evidence quality {:.2} is below threshold", analysis.evidence_quality),
            "cite data, a source, or a benchmark supporting this decision".to_string(),
            now_ms,
        ))
    }

    fn check_perspective_diversity(
        &self,
        req: &ContributionRequest<'_>,
        metrics: &crate::tracker::DiversityMetrics,
        now_ms: u64,
    ) -> Option<Intervention> {
        if metrics.overall_diversity >= self.config.minimum_diversity {
            return None;
        }
        Some(self.intervention(
            req.agent_id.clone(),
            InterventionKind::AddPerspective,
            format!("overall diversity {:.2} is below the floor", metrics.overall_diversity),
            "invite or rotate in an underrepresented perspective".to_string(),
            now_ms,
        ))
    }

    fn check_consensus_speed(
        &self,
        req: &ContributionRequest<'_>,
        metrics: &crate::tracker::DiversityMetrics,
        now_ms: u64,
    ) -> Option<Intervention> {
        if metrics.last_consensus_speed <= self.config.max_consensus_speed {
            return None;
        }
        Some(self.intervention(
            req.agent_id.clone(),
            InterventionKind::ForceDisagreement,
            format!("{} straight agreements reached consensus too quickly", metrics.last_consensus_speed),
            "slow down and surface a dissenting view before closing this decision".to_string(),
            now_ms,
        ))
    }

    fn intervention(
        &self,
        target: AgentId,
        kind: InterventionKind,
        reason: String,
        required_action: String,
        now_ms: u64,
    ) -> Intervention {
        Intervention {
            kind,
            reason,
            target,
            required_action,
            deadline_ms: now_ms + INTERVENTION_DEADLINE_MS,
        }
    }

    fn record(&self, req: &ContributionRequest<'_>, analysis: &AnalysisResult, now_ms: u64) {
        self.tracker.record_decision(DecisionRecord {
            timestamp_ms: now_ms,
            agent: req.agent_id.clone(),
            decision: req.content.to_string(),
            perspective: analysis.perspective,
            agreed_with_majority: req.agreed_with_majority,
            evidence_provided: analysis.evidence_quality > 0.0,
            challenged_assumptions: !analysis.features.disagreement_signals.is_empty(),
        });
    }
}

/// Lower number wins: FORCE_DISAGREEMENT is the most corrective action,
/// ADD_PERSPECTIVE the mildest.
fn priority(kind: InterventionKind) -> u8 {
    match kind {
        InterventionKind::ForceDisagreement => 0,
        InterventionKind::RequestEvidence => 1,
        InterventionKind::RotatePerspective => 2,
        InterventionKind::AddPerspective => 3,
    }
}

fn kind_label(kind: InterventionKind) -> &'static str {
    match kind {
        InterventionKind::ForceDisagreement => "FORCE_DISAGREEMENT",
        InterventionKind::RequestEvidence => "REQUEST_EVIDENCE",
        InterventionKind::RotatePerspective => "ROTATE_PERSPECTIVE",
        InterventionKind::AddPerspective => "ADD_PERSPECTIVE",
    }
}

fn pick_most_severe(mut candidates: Vec<Intervention>) -> Option<Intervention> {
    candidates.sort_by_key(|i| priority(i.kind));
    candidates.into_iter().next()
}

#[cfg(test)]
#[path = "enforcer_tests.rs"]
mod tests;
