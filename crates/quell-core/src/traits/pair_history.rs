//! Seam for the durable pair-decision store.

use crate::types::{HistoryEntry, PairKey};

/// Read-before-evaluate, write-after-evaluate access to adjudicated pairs.
///
/// The store is the only state carried between invocations; implementations
/// must persist entries durably between runs. Entries are never mutated in
/// place — `record` replaces an existing entry only under explicit forced
/// reprocessing by the caller.
pub trait PairHistory {
    /// Whether the pair has already been adjudicated.
    fn contains(&self, key: &PairKey) -> bool;

    /// The recorded adjudication, if any.
    fn get(&self, key: &PairKey) -> Option<&HistoryEntry>;

    /// Record an adjudication for the pair.
    fn record(&mut self, key: PairKey, entry: HistoryEntry);
}
