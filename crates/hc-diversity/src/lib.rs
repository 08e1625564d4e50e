// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hc-diversity: the Perspective Analyzer, Diversity Tracker, and
//! Diversity Enforcer that together keep multi-agent discussion from
//! collapsing into groupthink, plus the vote/edit weighting formulas
//! used to resolve conflicts and decisions once diverse input exists.

mod analyzer;
mod enforcer;
mod error;
mod resolution;
mod tracker;

pub use analyzer::{analyze, AnalysisResult, ContextItem, EchoPattern, EchoPatternKind, Features, Severity};
pub use enforcer::{ContributionKind, ContributionRequest, ContributionVerdict, DiversityEnforcer};
pub use error::DiversityError;
pub use resolution::{resolve_conflict, resolve_decision, vote_weight, DecisionResolution, EditCandidate};
pub use tracker::{DiversityMetrics, DiversityTracker};
