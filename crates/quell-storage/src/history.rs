//! The persisted history store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quell_core::errors::HistoryError;
use quell_core::traits::PairHistory;
use quell_core::types::{HistoryEntry, PairKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// On-disk layout of the history file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    pairs: BTreeMap<PairKey, HistoryEntry>,
    last_updated: Option<DateTime<Utc>>,
}

/// Flat-file history store.
///
/// The store exclusively owns persisted pair decisions; nothing else may be
/// used to infer duplicate status across runs. A read or write failure is
/// fatal for the run — without durable decisions, re-running could cancel
/// or comment twice.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    pairs: BTreeMap<PairKey, HistoryEntry>,
}

impl HistoryStore {
    /// Load the store from `path`. A missing file yields an empty store;
    /// an unreadable or corrupt file is an error.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        if !path.exists() {
            debug!(path = %path.display(), "no history file, starting empty");
            return Ok(Self {
                path: path.to_path_buf(),
                pairs: BTreeMap::new(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|e| HistoryError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file: HistoryFile =
            serde_json::from_str(&text).map_err(|e| HistoryError::Corrupt {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        info!(
            path = %path.display(),
            pairs = file.pairs.len(),
            "loaded pair history"
        );
        Ok(Self {
            path: path.to_path_buf(),
            pairs: file.pairs,
        })
    }

    /// Persist the store atomically: write a sibling temp file, then rename
    /// over the target so a crash mid-write never truncates the history.
    pub fn save(&self) -> Result<(), HistoryError> {
        let file = HistoryFile {
            pairs: self.pairs.clone(),
            last_updated: Some(Utc::now()),
        };
        let text =
            serde_json::to_string_pretty(&file).map_err(|e| HistoryError::WriteError {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| HistoryError::WriteError {
            path: tmp.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| HistoryError::WriteError {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        debug!(path = %self.path.display(), pairs = self.pairs.len(), "saved pair history");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PairHistory for HistoryStore {
    fn contains(&self, key: &PairKey) -> bool {
        self.pairs.contains_key(key)
    }

    fn get(&self, key: &PairKey) -> Option<&HistoryEntry> {
        self.pairs.get(key)
    }

    fn record(&mut self, key: PairKey, entry: HistoryEntry) {
        self.pairs.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quell_core::types::Decision;

    fn entry(score: i32, decision: Decision) -> HistoryEntry {
        HistoryEntry {
            decision,
            evaluated_at: Utc::now(),
            score,
        }
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = HistoryStore::load(&dir.path().join("history.json")).expect("load");
        assert!(store.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::load(&path).expect("load");
        store.record(PairKey::new("A-1", "A-2"), entry(94, Decision::Duplicate));
        store.record(PairKey::new("A-1", "A-3"), entry(24, Decision::NotDuplicate));
        store.save().expect("save");

        let reloaded = HistoryStore::load(&path).expect("reload");
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded
                .get(&PairKey::new("A-2", "A-1"))
                .map(|e| e.decision),
            Some(Decision::Duplicate)
        );
    }

    #[test]
    fn test_save_replaces_atomically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::load(&path).expect("load");
        store.record(PairKey::new("A-1", "A-2"), entry(94, Decision::Duplicate));
        store.save().expect("first save");
        store.record(PairKey::new("B-1", "B-2"), entry(80, Decision::Duplicate));
        store.save().expect("second save");

        // No temp file left behind, contents reflect the latest save.
        assert!(!path.with_extension("json.tmp").exists());
        let reloaded = HistoryStore::load(&path).expect("reload");
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = HistoryStore::load(&path).unwrap_err();
        assert!(matches!(err, HistoryError::Corrupt { .. }));
    }

    #[test]
    fn test_record_overwrites_existing_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = HistoryStore::load(&dir.path().join("h.json")).expect("load");
        let key = PairKey::new("A-1", "A-2");
        store.record(key.clone(), entry(10, Decision::NotDuplicate));
        store.record(key.clone(), entry(94, Decision::Duplicate));
        assert_eq!(store.get(&key).map(|e| e.score), Some(94));
    }
}
