//! Types for the ticket workflow.

use thiserror::Error;

use crate::attachment::{CleanupReport, StorageError, UploadBatchError};
use crate::ticket::{Ticket, TicketError, ValidationError};

/// Errors that can occur during a workflow action.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Draft failed validation; no store call was made.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Ticket store error.
    #[error("ticket store error: {0}")]
    Store(#[source] TicketError),

    /// An upload batch stopped early.
    #[error("{0}")]
    Upload(#[from] UploadBatchError),

    /// Import file is not valid JSON.
    #[error("invalid import file: {0}")]
    InvalidImport(#[source] serde_json::Error),

    /// Backup could not be serialized.
    #[error("export failed: {0}")]
    Export(#[source] serde_json::Error),

    /// Ticket not found.
    #[error("ticket not found: {0}")]
    NotFound(String),
}

impl From<TicketError> for WorkflowError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::NotFound(id) => WorkflowError::NotFound(id),
            other => WorkflowError::Store(other),
        }
    }
}

impl WorkflowError {
    /// Whether the failure was caught before anything was sent to a store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::Validation(_)
                | WorkflowError::Upload(UploadBatchError {
                    source: StorageError::TooLarge { .. },
                    ..
                })
        )
    }
}

/// Explicit answer to a destructive-action prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Result of a delete or delete-all action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Not confirmed; nothing was touched.
    Declined,
    /// Records removed, with the attachment cleanup report.
    Deleted { removed: u64, cleanup: CleanupReport },
}

/// Result of an import.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The file held nothing recognizable. Not an error.
    Empty,
    Imported(Vec<Ticket>),
}

impl ImportOutcome {
    pub fn count(&self) -> usize {
        match self {
            ImportOutcome::Empty => 0,
            ImportOutcome::Imported(tickets) => tickets.len(),
        }
    }
}
