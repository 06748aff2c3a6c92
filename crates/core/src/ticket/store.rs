//! Ticket storage trait and error type.

use std::fmt;

use async_trait::async_trait;

use crate::ticket::{Ticket, TicketDraft};

/// Error type for ticket operations.
#[derive(Debug)]
pub enum TicketError {
    /// Ticket not found.
    NotFound(String),
    /// Local database error.
    Database(String),
    /// Hosted backend rejected the request or could not be reached.
    Remote(String),
}

impl fmt::Display for TicketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketError::NotFound(id) => write!(f, "Ticket not found: {}", id),
            TicketError::Database(msg) => write!(f, "Database error: {}", msg),
            TicketError::Remote(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for TicketError {}

/// Trait for ticket storage backends.
///
/// Every create/update carries the full editable field set; updates replace
/// those fields wholesale rather than patching them.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// All tickets, newest first.
    async fn list(&self) -> Result<Vec<Ticket>, TicketError>;

    /// Get a ticket by ID.
    async fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// Create a ticket with a caller-assigned number.
    async fn create(&self, ticket_number: u32, draft: &TicketDraft) -> Result<Ticket, TicketError>;

    /// Replace the editable fields of an existing ticket.
    async fn update(&self, id: &str, draft: &TicketDraft) -> Result<Ticket, TicketError>;

    /// Delete one ticket record. Attachments are the caller's concern.
    async fn delete(&self, id: &str) -> Result<(), TicketError>;

    /// Delete every ticket record. Returns the number removed when known.
    async fn delete_all(&self) -> Result<u64, TicketError>;

    /// Create many tickets numbered `start_number`, `start_number + 1`, ...
    /// in input order.
    async fn bulk_create(
        &self,
        start_number: u32,
        drafts: &[TicketDraft],
    ) -> Result<Vec<Ticket>, TicketError>;
}
