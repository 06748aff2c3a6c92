//! Ticket workflow: sequencing rules over the ticket and object stores.
//!
//! - [`TicketService`] is stateless and shared (the HTTP handlers use it)
//! - [`TicketWorkflow`] is one session with a loaded collection and a draft

mod service;
mod session;
mod types;
mod view;

pub use service::TicketService;
pub use session::TicketWorkflow;
pub use types::{Confirmation, DeleteOutcome, ImportOutcome, WorkflowError};
pub use view::{AttachmentView, TicketView};
