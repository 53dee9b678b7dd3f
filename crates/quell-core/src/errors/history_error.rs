//! History store errors. All fatal for a run: without durable pair
//! decisions the run cannot guarantee idempotent cancellations.

/// Errors raised by the persisted pair-decision store.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to read history {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("failed to write history {path}: {message}")]
    WriteError { path: String, message: String },

    #[error("corrupt history file {path}: {message}")]
    Corrupt { path: String, message: String },
}
