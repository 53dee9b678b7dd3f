//! Pairwise evaluation of a fetched ticket batch.
//!
//! Generates all unordered pairs, skips pairs already adjudicated in the
//! history store, scores the rest, and records every decision back into the
//! store so no pair is scored twice across runs.

use chrono::Utc;
use quell_core::config::ScoringConfig;
use quell_core::traits::PairHistory;
use quell_core::types::{ConfidenceResult, Decision, HistoryEntry, PairKey, Ticket};
use tracing::{debug, info};

use crate::confidence::{Candidate, ConfidenceScorer};

/// A pair adjudicated as duplicate. `older` precedes `newer` by creation
/// instant (ties broken by id ordering).
#[derive(Debug, Clone)]
pub struct DuplicatePair {
    pub older: Ticket,
    pub newer: Ticket,
    pub result: ConfidenceResult,
}

/// What one evaluation pass produced.
#[derive(Debug, Default)]
pub struct EvaluationOutcome {
    pub duplicates: Vec<DuplicatePair>,
    /// Pairs scored this run.
    pub pairs_evaluated: usize,
    /// Pairs skipped because the history store already holds a decision.
    pub pairs_skipped: usize,
}

/// Iterates ticket pairs and drives the confidence engine.
pub struct PairEvaluator {
    scorer: ConfidenceScorer,
    /// Re-evaluate pairs already present in history, replacing their entries.
    force: bool,
}

impl PairEvaluator {
    pub fn new(config: &ScoringConfig, force: bool) -> Self {
        Self {
            scorer: ConfidenceScorer::new(config),
            force,
        }
    }

    /// Evaluate every unordered pair in the batch.
    ///
    /// Pairs are independent: evaluating (A,B) has no effect on (A,C), and
    /// clusters of three or more mutually similar tickets yield one entry
    /// per pair. Every scored pair is recorded into `history`, duplicate or
    /// not.
    pub fn evaluate(
        &self,
        tickets: &[Ticket],
        history: &mut dyn PairHistory,
    ) -> EvaluationOutcome {
        // Sort by creation so pair ordering (older, newer) is deterministic.
        let mut sorted: Vec<&Ticket> = tickets.iter().collect();
        sorted.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));

        let candidates: Vec<Candidate<'_>> = sorted.iter().map(|t| Candidate::new(*t)).collect();

        let mut outcome = EvaluationOutcome::default();

        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                let older = &candidates[i];
                let newer = &candidates[j];
                let key = PairKey::new(&older.ticket.id, &newer.ticket.id);

                if !self.force && history.contains(&key) {
                    debug!(pair = %key, "pair already adjudicated, skipping");
                    outcome.pairs_skipped += 1;
                    continue;
                }

                let result = self.scorer.score(older, newer);
                outcome.pairs_evaluated += 1;

                debug!(
                    pair = %key,
                    score = result.score,
                    duplicate = result.is_duplicate,
                    "scored pair"
                );

                history.record(
                    key.clone(),
                    HistoryEntry {
                        decision: if result.is_duplicate {
                            Decision::Duplicate
                        } else {
                            Decision::NotDuplicate
                        },
                        evaluated_at: Utc::now(),
                        score: result.score,
                    },
                );

                if result.is_duplicate {
                    info!(
                        pair = %key,
                        score = result.score,
                        "duplicate detected: {}",
                        result.reasons.join(", ")
                    );
                    outcome.duplicates.push(DuplicatePair {
                        older: older.ticket.clone(),
                        newer: newer.ticket.clone(),
                        result,
                    });
                }
            }
        }

        outcome
    }
}
