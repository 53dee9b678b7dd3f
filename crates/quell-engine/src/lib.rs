//! # quell-engine
//!
//! The duplicate-detection scoring engine: subject normalization,
//! character-sequence similarity, domain pattern detection, weighted
//! confidence scoring, pair evaluation against the history store, and
//! decision execution against the ticket system.

pub mod confidence;
pub mod evaluator;
pub mod executor;
pub mod normalize;
pub mod patterns;
pub mod similarity;

pub use confidence::{Candidate, ConfidenceScorer};
pub use evaluator::{DuplicatePair, EvaluationOutcome, PairEvaluator};
pub use executor::{DecisionExecutor, ExecutionReport};
