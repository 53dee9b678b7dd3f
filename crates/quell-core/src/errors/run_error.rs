//! Run-level errors. Aggregates subsystem errors via `From` conversions.
//!
//! Only fatal-class failures surface here: a failed fetch, an unusable
//! history store, or rejected configuration. Per-pair action failures are
//! counted in `RunStats`, not raised.

use super::{ApiError, ConfigError, HistoryError};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("ticket fetch failed: {0}")]
    Fetch(#[from] ApiError),

    #[error("history store error: {0}")]
    History(#[from] HistoryError),
}
