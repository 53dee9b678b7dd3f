//! Ticket-system API errors.

/// Errors raised by the external ticket-system collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("unexpected status {status} from {endpoint}")]
    Http { status: u16, endpoint: String },

    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("no usable cancel transition for ticket {ticket_id}")]
    NoCancelTransition { ticket_id: String },
}
