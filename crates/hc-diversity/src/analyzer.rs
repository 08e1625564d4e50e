// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Perspective Analyzer: a pure function over statement text that
//! produces a feature vector, a detected perspective, and any
//! echo-pattern findings. No wall-clock or RNG access — determinism is
//! a hard requirement (spec's "Intervention determinism" property).

use once_cell::sync::Lazy;
use regex::Regex;

use hc_core::Perspective;

/// One prior statement in the rolling conversation window passed to
/// [`analyze`]. `agreed_with_majority` lets `analyze` detect an
/// AGREEMENT_CASCADE without needing access to any external history —
/// the caller (the Diversity Tracker) supplies the window.
#[derive(Debug, Clone)]
pub struct ContextItem {
    pub text: String,
    pub agreed_with_majority: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub sentiment: f64,
    pub certainty: f64,
    pub innovation: f64,
    pub risk_awareness: f64,
    pub evidence_based: f64,
    pub agreement_signals: Vec<String>,
    pub disagreement_signals: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Penalty applied to `diversity_contribution` per spec §4.4.
    pub fn penalty(self) -> f64 {
        match self {
            Severity::High => 0.3,
            Severity::Medium => 0.2,
            Severity::Low => 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoPatternKind {
    PhraseRepetition,
    AgreementCascade,
    Groupthink,
    Bandwagon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EchoPattern {
    pub kind: EchoPatternKind,
    pub severity: Severity,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub features: Features,
    pub perspective: Perspective,
    pub perspective_confidence: f64,
    pub echo_patterns: Vec<EchoPattern>,
    pub evidence_quality: f64,
    pub diversity_contribution: f64,
}

impl AnalysisResult {
    /// The single highest-severity echo pattern present, if any.
    pub fn worst_echo_pattern(&self) -> Option<&EchoPattern> {
        self.echo_patterns.iter().max_by_key(|p| p.severity)
    }
}

struct Lexicon {
    positive: &'static [&'static str],
    negative: &'static [&'static str],
    certain: &'static [&'static str],
    uncertain: &'static [&'static str],
    innovative: &'static [&'static str],
    risk: &'static [&'static str],
    agreement: &'static [&'static str],
    disagreement: &'static [&'static str],
    groupthink: &'static [&'static str],
    bandwagon: &'static [&'static str],
    vague: &'static [&'static str],
    stopwords: &'static [&'static str],
}

const LEXICON: Lexicon = Lexicon {
    positive: &["great", "excellent", "love", "good", "awesome", "promising", "happy", "works well"],
    negative: &["bad", "terrible", "broken", "fails", "hate", "worried", "concerned", "problem"],
    certain: &["definitely", "certainly", "clearly", "obviously", "always", "never fails", "guaranteed"],
    uncertain: &["maybe", "perhaps", "not sure", "might", "possibly", "i think", "unclear"],
    innovative: &["new approach", "innovative", "disrupt", "novel", "rethink", "reimagine", "experiment"],
    risk: &["risk", "danger", "careful", "caution", "might break", "edge case", "failure mode"],
    agreement: &["i agree", "agreed", "same here", "exactly", "that's right", "+1", "me too", "sounds good"],
    disagreement: &["i disagree", "however", "on the other hand", "i don't think", "but ", "actually no", "not convinced"],
    groupthink: &["we all agree", "consensus is clear", "everyone is on the same page", "no objections here"],
    bandwagon: &["since everyone", "like others said", "as everyone knows", "following the crowd"],
    vague: &["obviously", "everyone knows", "clearly true", "it's common sense"],
    stopwords: &["the", "a", "an", "is", "are", "it", "to", "of", "and", "or", "in", "on", "for", "this", "that", "i", "we"],
};

static EVIDENCE_STUDIES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)studies show").unwrap());
static EVIDENCE_DATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)data indicate").unwrap());
static EVIDENCE_PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+%").unwrap());
static EVIDENCE_BENCHMARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)benchmark").unwrap());
static EVIDENCE_SOURCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)source:").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z'-]*").unwrap());

fn count_hits(haystack: &str, needles: &[&str]) -> usize {
    let lower = haystack.to_lowercase();
    needles.iter().filter(|n| lower.contains(*n)).count()
}

fn matched<'a>(haystack: &str, needles: &'a [&'a str]) -> Vec<String> {
    let lower = haystack.to_lowercase();
    needles.iter().filter(|n| lower.contains(**n)).map(|n| n.to_string()).collect()
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

fn clamp_signed(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

fn extract_features(statement: &str) -> Features {
    let pos = count_hits(statement, LEXICON.positive) as f64;
    let neg = count_hits(statement, LEXICON.negative) as f64;
    let total_sentiment_hits = (pos + neg).max(1.0);
    let sentiment = clamp_signed((pos - neg) / total_sentiment_hits);

    let certain = count_hits(statement, LEXICON.certain) as f64;
    let uncertain = count_hits(statement, LEXICON.uncertain) as f64;
    let certainty = clamp01(0.5 + 0.2 * certain - 0.2 * uncertain);

    let innovation = clamp01(0.2 * count_hits(statement, LEXICON.innovative) as f64);
    let risk_awareness = clamp01(0.2 * count_hits(statement, LEXICON.risk) as f64);

    let evidence_based = evidence_quality(statement);

    let agreement_signals = matched(statement, LEXICON.agreement);
    let disagreement_signals = matched(statement, LEXICON.disagreement);

    let keywords: Vec<String> = WORD_RE
        .find_iter(statement)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.len() > 3 && !LEXICON.stopwords.contains(&w.as_str()))
        .collect();

    Features {
        sentiment,
        certainty,
        innovation,
        risk_awareness,
        evidence_based,
        agreement_signals,
        disagreement_signals,
        keywords,
    }
}

/// Weighted sum of evidence-marker regex hits, minus vague-language
/// penalties, clamped to `[0, 1]`.
fn evidence_quality(statement: &str) -> f64 {
    let mut score = 0.0;
    if EVIDENCE_STUDIES.is_match(statement) {
        score += 0.3;
    }
    if EVIDENCE_DATA.is_match(statement) {
        score += 0.3;
    }
    if EVIDENCE_PERCENT.is_match(statement) {
        score += 0.2;
    }
    if EVIDENCE_BENCHMARK.is_match(statement) {
        score += 0.2;
    }
    if EVIDENCE_SOURCE.is_match(statement) {
        score += 0.3;
    }
    score -= 0.2 * count_hits(statement, LEXICON.vague) as f64;
    clamp01(score)
}

/// Apply the fixed rule table from spec §4.4, selecting the
/// highest-scoring perspective. Defaults to PRAGMATIST at 0.5.
fn detect_perspective(features: &Features) -> (Perspective, f64) {
    let mut candidates: Vec<(Perspective, f64)> = Vec::new();

    if features.sentiment > 0.5 && features.innovation > 0.5 {
        candidates.push((Perspective::Optimist, 0.8));
        candidates.push((Perspective::Innovator, 0.7));
    }
    if features.certainty < 0.3 && features.evidence_based > 0.5 {
        candidates.push((Perspective::Skeptic, 0.8));
        candidates.push((Perspective::Analytical, 0.7));
    }
    if features.innovation < 0.3 && features.risk_awareness > 0.5 {
        candidates.push((Perspective::Conservative, 0.8));
    }
    if features.sentiment.abs() < 0.3 && features.evidence_based > 0.3 {
        candidates.push((Perspective::Pragmatist, 0.7));
    }
    if features.innovation > 0.7 {
        candidates.push((Perspective::Creative, 0.6));
    }

    candidates
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((Perspective::Pragmatist, 0.5))
}

/// n-grams of size 2 and 3 over lowercase whitespace-split tokens.
fn ngrams(text: &str, n: usize) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < n {
        return Vec::new();
    }
    tokens.windows(n).map(|w| w.join(" ").to_lowercase()).collect()
}

fn detect_echo_patterns(statement: &str, features: &Features, recent_context: &[ContextItem]) -> Vec<EchoPattern> {
    let mut patterns = Vec::new();

    // PHRASE_REPETITION: a 2- or 3-gram from this statement recurring
    // more than twice across the supplied window (this statement plus
    // recent context).
    let mut corpus: Vec<&str> = vec![statement];
    corpus.extend(recent_context.iter().map(|c| c.text.as_str()));

    for n in [2usize, 3usize] {
        for gram in ngrams(statement, n) {
            let count = corpus.iter().filter(|text| ngrams(text, n).contains(&gram)).count();
            if count > 2 {
                patterns.push(EchoPattern {
                    kind: EchoPatternKind::PhraseRepetition,
                    severity: Severity::Low,
                    detail: format!("phrase \"{gram}\" recurs {count} times"),
                });
                break;
            }
        }
    }

    // AGREEMENT_CASCADE: this statement agrees, and at least 2 of the
    // last 3 context items also agreed with the majority.
    if !features.agreement_signals.is_empty() {
        let recent_agreements = recent_context
            .iter()
            .rev()
            .take(3)
            .filter(|c| c.agreed_with_majority)
            .count();
        if recent_agreements >= 2 {
            patterns.push(EchoPattern {
                kind: EchoPatternKind::AgreementCascade,
                severity: Severity::Medium,
                detail: format!("{recent_agreements} of the last 3 contributions also agreed"),
            });
        }
    }

    if !matched(statement, LEXICON.groupthink).is_empty() {
        patterns.push(EchoPattern {
            kind: EchoPatternKind::Groupthink,
            severity: Severity::High,
            detail: "statement echoes a groupthink phrase".to_string(),
        });
    }

    if !matched(statement, LEXICON.bandwagon).is_empty() {
        patterns.push(EchoPattern {
            kind: EchoPatternKind::Bandwagon,
            severity: Severity::High,
            detail: "statement echoes a bandwagon phrase".to_string(),
        });
    }

    patterns
}

fn diversity_contribution(features: &Features, evidence_quality: f64, echo_patterns: &[EchoPattern]) -> f64 {
    let mut score = 0.5;
    if !features.disagreement_signals.is_empty() {
        score += 0.3;
    }
    score += 0.2 * evidence_quality;
    for pattern in echo_patterns {
        score -= pattern.severity.penalty();
    }
    score += (features.keywords.len() as f64 * 0.04).min(0.2);
    clamp01(score)
}

/// Analyze `statement` from `agent_id`, given a rolling window of
/// recent context. Pure and deterministic: no clock, no RNG.
pub fn analyze(statement: &str, recent_context: &[ContextItem]) -> AnalysisResult {
    let features = extract_features(statement);
    let (perspective, perspective_confidence) = detect_perspective(&features);
    let echo_patterns = detect_echo_patterns(statement, &features, recent_context);
    let evidence_quality = features.evidence_based;
    let diversity_contribution = diversity_contribution(&features, evidence_quality, &echo_patterns);

    AnalysisResult {
        features,
        perspective,
        perspective_confidence,
        echo_patterns,
        evidence_quality,
        diversity_contribution,
    }
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
