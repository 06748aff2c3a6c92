//! Ticket records, their storage backends, and collection queries.

mod filter;
mod rest_store;
mod sqlite_store;
mod store;
mod types;

pub use filter::{TicketFilter, TicketStats};
pub use rest_store::RestTicketStore;
pub use sqlite_store::SqliteTicketStore;
pub use store::{TicketError, TicketStore};
pub use types::{
    next_ticket_number, Attachment, Ticket, TicketDraft, TicketStatus, ValidationError,
    DEFAULT_TICKET_NAME,
};
