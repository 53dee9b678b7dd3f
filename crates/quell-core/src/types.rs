//! Shared data model: tickets, pair keys, confidence results, history
//! entries, and run counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse status category of a ticket, as reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusCategory {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl StatusCategory {
    /// Whether the status belongs to the resolved family (done/cancelled)
    /// as opposed to the open family (todo/in-progress).
    pub fn is_terminal(self) -> bool {
        matches!(self, StatusCategory::Done | StatusCategory::Cancelled)
    }
}

/// A ticket as supplied by the external tracker for the duration of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Tracker-assigned identifier, unique within a project (e.g. `OPS-412`).
    pub id: String,
    /// Raw subject line.
    pub subject: String,
    /// Body text; empty when the tracker returned none.
    #[serde(default)]
    pub description: String,
    /// Creation instant, UTC.
    pub created: DateTime<Utc>,
    /// Reporter identifier. May denote a human account or a known
    /// automation account.
    pub reporter: String,
    pub status: StatusCategory,
}

/// Order-independent identifier for an unordered pair of ticket ids.
///
/// `PairKey::new(a, b) == PairKey::new(b, a)` always holds; the key is the
/// two ids sorted and joined with `|` so it can key a JSON map directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            PairKey(format!("{a}|{b}"))
        } else {
            PairKey(format!("{b}|{a}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of scoring one ticket pair.
///
/// `score` is the unclamped weighted sum (0–115 by construction of the
/// weights; the status penalty can push it below zero). `reasons` lists the
/// tiers that fired, in firing order, for the explanation comment.
#[derive(Debug, Clone)]
pub struct ConfidenceResult {
    pub score: i32,
    pub reasons: Vec<String>,
    pub is_duplicate: bool,
}

/// Adjudication recorded for a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Duplicate,
    NotDuplicate,
}

/// Persisted record of one pair evaluation. Written once per pair; replaced
/// only under explicit forced reprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub decision: Decision,
    pub evaluated_at: DateTime<Utc>,
    pub score: i32,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub tickets_scanned: usize,
    pub pairs_evaluated: usize,
    pub pairs_skipped: usize,
    pub duplicates_found: usize,
    pub tickets_cancelled: usize,
    pub action_errors: usize,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "scanned={} evaluated={} history-hits={} duplicates={} cancelled={} errors={}",
            self.tickets_scanned,
            self.pairs_evaluated,
            self.pairs_skipped,
            self.duplicates_found,
            self.tickets_cancelled,
            self.action_errors,
        )
    }
}
