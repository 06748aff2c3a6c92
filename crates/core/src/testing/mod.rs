//! Testing utilities and mock implementations.
//!
//! The ticket side needs no mock: `SqliteTicketStore::in_memory()` is a real
//! store without any setup. Object storage is mocked so tests can inspect
//! uploads and deletes and inject failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticketdesk_core::testing::MockObjectStore;
//! use ticketdesk_core::ticket::SqliteTicketStore;
//! use ticketdesk_core::workflow::TicketService;
//!
//! let objects = Arc::new(MockObjectStore::new());
//! let tickets = Arc::new(SqliteTicketStore::in_memory()?);
//! let service = TicketService::new(tickets, objects.clone());
//! ```

mod mock_object_store;

pub use mock_object_store::{MockObjectStore, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ticket::{Attachment, TicketDraft};

    /// A draft that passes validation.
    pub fn draft(name: &str, details: &str) -> TicketDraft {
        TicketDraft {
            name: name.to_string(),
            details: details.to_string(),
            date: "2024-01-15".to_string(),
            ..TicketDraft::new()
        }
    }

    /// An attachment stored under `uploads/<name>`.
    pub fn stored_attachment(name: &str) -> Attachment {
        let path = format!("uploads/{}", name);
        Attachment::new(format!("mock://{}", path), name, path)
    }

    /// An attachment with no stored object behind it.
    pub fn external_attachment(name: &str) -> Attachment {
        Attachment::new(format!("https://elsewhere.example/{}", name), name, "")
    }
}
