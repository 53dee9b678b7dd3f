//! Seam for the external ticket-system collaborator.

use chrono::{DateTime, Utc};

use crate::errors::ApiError;
use crate::types::Ticket;

/// Operations Quell consumes from the ticket system.
///
/// The run model is single-threaded synchronous batch, so every call blocks.
/// Each call is a discrete, independently retryable unit of work; retry
/// policy belongs to the caller, not the implementation.
pub trait TicketApi {
    /// Fetch tickets created since `created_since` across the given projects.
    fn search(
        &self,
        projects: &[String],
        created_since: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, ApiError>;

    /// Move a ticket into a cancelled/terminal state.
    fn cancel(&self, ticket_id: &str) -> Result<(), ApiError>;

    /// Attach a comment to a ticket.
    fn comment(&self, ticket_id: &str, text: &str) -> Result<(), ApiError>;
}
