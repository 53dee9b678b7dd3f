//! Scoring configuration: thresholds, automation markers, domain phrases.

use serde::{Deserialize, Serialize};

/// Domain phrases flagged when present in both subjects of a pair.
/// Corroborating signal only; capped well below the duplicate threshold.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "capital call",
    "reporting package",
    "action required",
    "payment",
    "invoice",
    "statement",
    "fund",
    "investor",
    "quarterly report",
    "monthly report",
    "distribution",
    "subscription",
    "redemption",
    "transfer",
];

/// Reporter-id substrings that mark a known automation account.
pub const DEFAULT_AUTOMATION_MARKERS: &[&str] = &["automation", "bot"];

/// Tunable inputs to the confidence engine.
///
/// Passed explicitly into the scorer and evaluator at construction, never
/// read from ambient state, so multiple threshold profiles can be tested in
/// isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum total score required to declare duplication (default 75/115).
    pub confidence_threshold: i32,
    /// Subject-similarity bound for the high-similarity tier.
    pub similarity_threshold: f64,
    /// Reporter-id substrings treated as automation accounts.
    pub automation_markers: Vec<String>,
    /// Domain phrase list for the pattern detector.
    pub patterns: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 75,
            similarity_threshold: 0.85,
            automation_markers: DEFAULT_AUTOMATION_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            patterns: DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
