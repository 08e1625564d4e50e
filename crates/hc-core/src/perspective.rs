// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! The closed nine-label perspective enumeration and its fixed score
//! vectors.

use serde::{Deserialize, Serialize};

/// A fixed five-axis score vector describing how a perspective tends to
/// behave: `(risk_tolerance, innovation_bias, evidence_preference,
/// decision_speed, conflict_tolerance)`, each in `[0, 1]`.
pub type ScoreVector = (f64, f64, f64, f64, f64);

/// The closed enum of perspective labels agents can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Perspective {
    Optimist,
    Skeptic,
    Pragmatist,
    Innovator,
    Conservative,
    Analytical,
    Creative,
    DetailOriented,
    BigPicture,
}

/// All nine perspectives, in a fixed iteration order.
pub const ALL_PERSPECTIVES: [Perspective; 9] = [
    Perspective::Optimist,
    Perspective::Skeptic,
    Perspective::Pragmatist,
    Perspective::Innovator,
    Perspective::Conservative,
    Perspective::Analytical,
    Perspective::Creative,
    Perspective::DetailOriented,
    Perspective::BigPicture,
];

/// Perspectives required as a baseline, regardless of who else is present.
pub const REQUIRED_BASELINE: [Perspective; 2] = [Perspective::Skeptic, Perspective::Analytical];

impl Perspective {
    /// The fixed score vector associated with this perspective.
    pub const fn score_vector(self) -> ScoreVector {
        match self {
            Perspective::Optimist => (0.7, 0.7, 0.3, 0.7, 0.4),
            Perspective::Skeptic => (0.2, 0.3, 0.9, 0.3, 0.7),
            Perspective::Pragmatist => (0.5, 0.4, 0.6, 0.6, 0.5),
            Perspective::Innovator => (0.8, 0.9, 0.4, 0.6, 0.6),
            Perspective::Conservative => (0.1, 0.1, 0.7, 0.4, 0.3),
            Perspective::Analytical => (0.3, 0.3, 0.9, 0.3, 0.5),
            Perspective::Creative => (0.7, 0.9, 0.2, 0.7, 0.6),
            Perspective::DetailOriented => (0.2, 0.2, 0.8, 0.3, 0.4),
            Perspective::BigPicture => (0.6, 0.6, 0.4, 0.7, 0.5),
        }
    }

    /// Weight applied to this perspective's votes in decision resolution
    /// and to its edits in conflict resolution.
    pub const fn resolution_weight(self) -> f64 {
        match self {
            Perspective::Skeptic => 1.2,
            Perspective::Analytical => 1.1,
            Perspective::Conservative => 1.1,
            Perspective::DetailOriented => 1.1,
            Perspective::Pragmatist | Perspective::Innovator | Perspective::BigPicture => 1.0,
            Perspective::Optimist | Perspective::Creative => 0.9,
        }
    }
}

impl std::fmt::Display for Perspective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Perspective::Optimist => "OPTIMIST",
            Perspective::Skeptic => "SKEPTIC",
            Perspective::Pragmatist => "PRAGMATIST",
            Perspective::Innovator => "INNOVATOR",
            Perspective::Conservative => "CONSERVATIVE",
            Perspective::Analytical => "ANALYTICAL",
            Perspective::Creative => "CREATIVE",
            Perspective::DetailOriented => "DETAIL_ORIENTED",
            Perspective::BigPicture => "BIG_PICTURE",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[path = "perspective_tests.rs"]
mod tests;
