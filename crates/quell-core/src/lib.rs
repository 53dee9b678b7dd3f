//! # quell-core
//!
//! Core types, errors, configuration, and trait seams for the Quell
//! duplicate-ticket canceller. Everything shared between the scoring
//! engine, the history store, and the CLI lives here.

pub mod config;
pub mod errors;
pub mod traits;
pub mod types;

pub use config::{CliOverrides, QuellConfig};
pub use traits::{PairHistory, TicketApi};
pub use types::{
    ConfidenceResult, Decision, HistoryEntry, PairKey, RunStats, StatusCategory, Ticket,
};
