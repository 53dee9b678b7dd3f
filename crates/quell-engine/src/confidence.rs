//! Weighted confidence scoring for ticket pairs.
//!
//! Additive model, components computed independently then summed:
//!
//! | Component      | Max | Signal                                         |
//! |----------------|-----|------------------------------------------------|
//! | Subject        | 45  | tiered similarity of normalized/core subjects  |
//! | Time proximity | 25  | creation-instant distance                      |
//! | Reporter       | 20  | same reporter, bonus for automation accounts   |
//! | Description    | 15  | similarity of normalized description prefixes  |
//! | Patterns       | 10  | shared domain phrases                          |
//! | Status penalty | −5  | coarse status buckets differ                   |
//!
//! Subject similarity dominates because duplicates from the same email
//! thread overwhelmingly share near-identical subjects. Reporter and
//! pattern signals corroborate but are capped low enough that neither
//! alone, nor with only one other weak signal, can cross the default
//! 75-point bar. The total is unclamped; the penalty can push it below
//! zero, which simply never reaches a positive threshold.

use quell_core::config::ScoringConfig;
use quell_core::types::{ConfidenceResult, Ticket};

use crate::normalize::{self, NormalizedSubject};
use crate::patterns::PatternDetector;
use crate::similarity::similarity;

pub const MAX_SUBJECT: i32 = 45;
pub const MAX_TIME: i32 = 25;
pub const MAX_REPORTER: i32 = 20;
pub const MAX_DESCRIPTION: i32 = 15;
pub const MAX_PATTERNS: i32 = 10;
pub const STATUS_PENALTY: i32 = 5;

/// Characters of description taking part in similarity.
const DESCRIPTION_PREFIX: usize = 500;
/// Descriptions at or below this raw length carry no signal.
const DESCRIPTION_MIN_CHARS: usize = 20;

/// A ticket with its derived comparison keys, normalized once per run.
#[derive(Debug)]
pub struct Candidate<'a> {
    pub ticket: &'a Ticket,
    pub subject: NormalizedSubject,
    /// Normalized description prefix; `None` when the raw description is
    /// too short to carry signal.
    pub description: Option<String>,
    /// Subject plus description prefix, the pattern-detector input.
    pub combined: String,
}

impl<'a> Candidate<'a> {
    pub fn new(ticket: &'a Ticket) -> Self {
        let subject = NormalizedSubject::of(&ticket.subject);
        let description = if ticket.description.chars().count() > DESCRIPTION_MIN_CHARS {
            Some(normalize::normalize_description(
                &ticket.description,
                DESCRIPTION_PREFIX,
            ))
        } else {
            None
        };
        let combined = match &description {
            Some(desc) => format!("{} {}", subject.normalized, desc),
            None => subject.normalized.clone(),
        };
        Self {
            ticket,
            subject,
            description,
            combined,
        }
    }
}

/// The pairwise confidence engine.
pub struct ConfidenceScorer {
    threshold: i32,
    high_similarity: f64,
    automation_markers: Vec<String>,
    detector: PatternDetector,
}

impl ConfidenceScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            threshold: config.confidence_threshold,
            high_similarity: config.similarity_threshold,
            automation_markers: config
                .automation_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            detector: PatternDetector::new(&config.patterns),
        }
    }

    /// Score one unordered pair. Symmetric in its arguments.
    pub fn score(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> ConfidenceResult {
        let mut total = 0;
        let mut reasons = Vec::new();

        let components = [
            self.subject_points(a, b),
            time_points(a.ticket, b.ticket),
            self.reporter_points(a.ticket, b.ticket),
            description_points(a, b),
            self.pattern_points(a, b),
        ];
        for (points, reason) in components {
            total += points;
            if let Some(reason) = reason {
                reasons.push(reason);
            }
        }

        // Different coarse status buckets hint at intentionally separate
        // tickets. Additive and non-floored.
        if a.ticket.status.is_terminal() != b.ticket.status.is_terminal() {
            total -= STATUS_PENALTY;
            reasons.push("(different status categories)".to_string());
        }

        ConfidenceResult {
            score: total,
            is_duplicate: total >= self.threshold,
            reasons,
        }
    }

    fn subject_points(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> (i32, Option<String>) {
        let norm_a = &a.subject.normalized;
        let norm_b = &b.subject.normalized;
        let core_a = &a.subject.core;
        let core_b = &b.subject.core;

        let norm_sim = similarity(norm_a, norm_b);
        let core_sim = if core_a.is_empty() || core_b.is_empty() {
            0.0
        } else {
            similarity(core_a, core_b)
        };

        // Exact/core matches require substance so two stripped-to-nothing
        // subjects do not count as identical.
        if norm_a == norm_b && norm_a.len() > 5 {
            (45, Some("exact subject match".to_string()))
        } else if norm_sim >= 0.95 {
            (
                40,
                Some(format!(
                    "very high subject similarity ({:.1}%)",
                    norm_sim * 100.0
                )),
            )
        } else if norm_sim >= self.high_similarity {
            (
                35,
                Some(format!(
                    "high subject similarity ({:.1}%)",
                    norm_sim * 100.0
                )),
            )
        } else if core_a == core_b && core_a.len() > 10 {
            (30, Some("core subject match".to_string()))
        } else if norm_sim >= 0.75 {
            (
                25,
                Some(format!(
                    "good subject similarity ({:.1}%)",
                    norm_sim * 100.0
                )),
            )
        } else if core_sim >= 0.80 && core_a.len() > 10 {
            (
                20,
                Some(format!("core similarity ({:.1}%)", core_sim * 100.0)),
            )
        } else {
            (0, None)
        }
    }

    fn reporter_points(&self, a: &Ticket, b: &Ticket) -> (i32, Option<String>) {
        if a.reporter.is_empty() || a.reporter != b.reporter {
            return (0, None);
        }
        let reporter = a.reporter.to_lowercase();
        let is_automation = self
            .automation_markers
            .iter()
            .any(|m| reporter.contains(m.as_str()));
        if is_automation {
            (20, Some(format!("same automation reporter: {}", a.reporter)))
        } else {
            (15, Some(format!("same reporter: {}", a.reporter)))
        }
    }

    fn pattern_points(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> (i32, Option<String>) {
        let shared = self.detector.shared(&a.combined, &b.combined);
        match shared.len() {
            0 => (0, None),
            1 => (4, Some(format!("domain pattern detected: {}", shared[0]))),
            2 => (7, Some(format!("domain patterns matched ({})", shared.len()))),
            _ => (
                10,
                Some(format!(
                    "multiple domain patterns matched ({})",
                    shared.len()
                )),
            ),
        }
    }
}

fn time_points(a: &Ticket, b: &Ticket) -> (i32, Option<String>) {
    let diff_minutes = (a.created - b.created).num_seconds().abs() as f64 / 60.0;

    if diff_minutes <= 1.0 {
        (25, Some("created within 1 minute".to_string()))
    } else if diff_minutes <= 5.0 {
        (
            20,
            Some(format!("created within {} minutes", diff_minutes.ceil() as i64)),
        )
    } else if diff_minutes <= 15.0 {
        (
            15,
            Some(format!("created within {} minutes", diff_minutes.ceil() as i64)),
        )
    } else if diff_minutes <= 30.0 {
        (
            10,
            Some(format!("created within {} minutes", diff_minutes.ceil() as i64)),
        )
    } else if diff_minutes <= 60.0 {
        (5, Some("created within 1 hour".to_string()))
    } else {
        (0, None)
    }
}

fn description_points(a: &Candidate<'_>, b: &Candidate<'_>) -> (i32, Option<String>) {
    let (Some(desc_a), Some(desc_b)) = (&a.description, &b.description) else {
        return (0, None);
    };
    let sim = similarity(desc_a, desc_b);

    if sim >= 0.90 {
        (
            15,
            Some(format!("very similar descriptions ({:.1}%)", sim * 100.0)),
        )
    } else if sim >= 0.75 {
        (
            10,
            Some(format!("similar descriptions ({:.1}%)", sim * 100.0)),
        )
    } else if sim >= 0.60 {
        (5, Some("somewhat similar descriptions".to_string()))
    } else {
        (0, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use quell_core::types::StatusCategory;

    fn ticket(id: &str, subject: &str, offset_secs: i64, reporter: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            subject: subject.to_string(),
            description: String::new(),
            created: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
            reporter: reporter.to_string(),
            status: StatusCategory::Todo,
        }
    }

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::new(&ScoringConfig::default())
    }

    fn score(a: &Ticket, b: &Ticket) -> ConfidenceResult {
        scorer().score(&Candidate::new(a), &Candidate::new(b))
    }

    #[test]
    fn test_max_component_sum() {
        assert_eq!(
            MAX_SUBJECT + MAX_TIME + MAX_REPORTER + MAX_DESCRIPTION + MAX_PATTERNS,
            115
        );
    }

    #[test]
    fn test_capital_call_duplicate_scenario() {
        let a = ticket(
            "NVSTRS-370",
            "Re: Q2 2025 Capital Call Notice - NVSTRS-371",
            0,
            "fund-automation",
        );
        let b = ticket(
            "NVSTRS-372",
            "FWD: Q2 2025 Capital Call Notice [External] (2)",
            30,
            "fund-automation",
        );
        let result = score(&a, &b);
        // subject 45 + time 25 + reporter 20 + pattern 4
        assert_eq!(result.score, 94);
        assert!(result.is_duplicate);
        assert_eq!(result.reasons[0], "exact subject match");
    }

    #[test]
    fn test_scoring_is_symmetric() {
        let a = ticket("A-1", "Re: Invoice 2207 overdue", 0, "billing-bot");
        let b = ticket("A-2", "FW: Invoice 2207 overdue reminder", 90, "billing-bot");
        let ab = score(&a, &b);
        let ba = score(&b, &a);
        assert_eq!(ab.score, ba.score);
        assert_eq!(ab.is_duplicate, ba.is_duplicate);
    }

    #[test]
    fn test_weak_signals_never_reach_threshold() {
        // Same automation reporter (20) plus one shared pattern (4) = 24.
        let a = ticket(
            "A-1",
            "invoice from acme corporation for services",
            0,
            "billing-bot",
        );
        let b = ticket(
            "A-2",
            "overdue invoice reminder second attempt",
            2 * 3600,
            "billing-bot",
        );
        let guard = similarity(
            &normalize::normalize(&a.subject),
            &normalize::normalize(&b.subject),
        );
        assert!(guard < 0.75, "subjects too similar for this test: {guard}");

        let result = score(&a, &b);
        assert_eq!(result.score, 24);
        assert!(!result.is_duplicate);
    }

    #[test]
    fn test_moderate_similarity_different_reporters_not_duplicate() {
        let a = ticket("A-1", "office move scheduled next month", 0, "alice");
        let b = ticket("A-2", "office relocation planned for summer", 60, "bob");
        let guard = similarity(
            &normalize::normalize(&a.subject),
            &normalize::normalize(&b.subject),
        );
        assert!(guard < 0.75, "subjects too similar for this test: {guard}");

        let result = score(&a, &b);
        // time proximity (25) is the only firing component
        assert_eq!(result.score, 25);
        assert!(!result.is_duplicate);
    }

    #[test]
    fn test_status_penalty_is_additive() {
        let a = ticket("A-1", "Re: Wire transfer confirmation needed", 0, "ops-bot");
        let mut b = ticket("A-2", "FW: Wire transfer confirmation needed", 20, "ops-bot");

        let matching = score(&a, &b);

        b.status = StatusCategory::Done;
        let penalized = score(&a, &b);

        assert_eq!(penalized.score, matching.score - 5);
        assert!(penalized
            .reasons
            .contains(&"(different status categories)".to_string()));
    }

    #[test]
    fn test_same_human_reporter_scores_fifteen() {
        let a = ticket("A-1", "Quarterly numbers missing", 0, "alice");
        let b = ticket("A-2", "Printer jam on floor 3", 2 * 3600, "alice");
        let result = score(&a, &b);
        assert_eq!(result.score, 15);
    }

    #[test]
    fn test_identical_descriptions_add_fifteen() {
        let desc = "The attached statement for account 2207 does not reconcile \
                    against the ledger export.";
        let mut a = ticket("A-1", "Reconciliation issue", 0, "alice");
        let mut b = ticket("A-2", "Ledger mismatch", 2 * 3600, "bob");
        a.description = desc.to_string();
        b.description = desc.to_string();

        let with_desc = score(&a, &b);
        a.description.clear();
        b.description.clear();
        let without_desc = score(&a, &b);

        // identical descriptions (15) plus the shared "statement" pattern (4)
        assert_eq!(with_desc.score - without_desc.score, 19);
    }

    #[test]
    fn test_short_descriptions_carry_no_signal() {
        let mut a = ticket("A-1", "Reconciliation issue", 0, "alice");
        let mut b = ticket("A-2", "Ledger mismatch", 2 * 3600, "bob");
        a.description = "same short text".to_string();
        b.description = "same short text".to_string();
        assert_eq!(score(&a, &b).score, 0);
    }

    #[test]
    fn test_time_tiers() {
        let base = ticket("A-1", "alpha", 0, "alice");
        for (offset, expected) in [
            (30, 25),
            (4 * 60, 20),
            (12 * 60, 15),
            (25 * 60, 10),
            (50 * 60, 5),
            (2 * 3600, 0),
        ] {
            let other = ticket("A-2", "omega", offset, "bob");
            let (points, _) = time_points(&base, &other);
            assert_eq!(points, expected, "offset {offset}s");
        }
    }

    #[test]
    fn test_empty_reporters_never_match() {
        let a = ticket("A-1", "alpha", 0, "");
        let b = ticket("A-2", "omega", 0, "");
        let scorer = scorer();
        let (points, _) = scorer.reporter_points(&a, &b);
        assert_eq!(points, 0);
    }

    #[test]
    fn test_negative_total_possible() {
        let mut a = ticket("A-1", "alpha", 0, "alice");
        let b = ticket("A-2", "omega", 4 * 3600, "bob");
        a.status = StatusCategory::Done;
        let result = score(&a, &b);
        assert_eq!(result.score, -5);
        assert!(!result.is_duplicate);
    }
}
