//! Scan-window configuration.

use serde::{Deserialize, Serialize};

/// How far back and how wide a run fetches tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Recency window in days; only tickets created inside it are paired.
    pub days_back: u32,
    /// Upper bound on tickets fetched by one search query, across all
    /// requested projects combined.
    pub max_results: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            days_back: 7,
            max_results: 200,
        }
    }
}
