//! Shared traits used across Quell crates.

pub mod pair_history;
pub mod ticket_api;

pub use pair_history::PairHistory;
pub use ticket_api::TicketApi;
