//! # quell-storage
//!
//! Durable pair-decision history. Flat JSON file keyed by `PairKey`,
//! loaded before evaluation, saved atomically (write-temp-then-rename)
//! after each run so a crash never truncates the store.

pub mod history;

pub use history::HistoryStore;
