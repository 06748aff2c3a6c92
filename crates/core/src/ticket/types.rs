//! Core ticket data types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TagCatalog;
use crate::text;

/// Name used when a ticket arrives without one.
pub const DEFAULT_TICKET_NAME: &str = "تذكرة";

// ============================================================================
// Status
// ============================================================================

/// Workflow status of a ticket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TicketStatus {
    /// All statuses, in display order.
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Pending,
        TicketStatus::InProgress,
        TicketStatus::Completed,
    ];

    /// Wire value (`pending`, `in-progress`, `completed`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Completed => "completed",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "قيد الانتظار",
            TicketStatus::InProgress => "قيد التنفيذ",
            TicketStatus::Completed => "مكتمل",
        }
    }

    /// Parse a wire value; `None` for anything outside the vocabulary.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Attachment
// ============================================================================

/// A file held in the object store and referenced by a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// Public retrieval URL.
    pub url: String,
    /// Original file name, used for display and classification.
    pub name: String,
    /// Storage key; empty when the attachment was never uploaded here.
    #[serde(default)]
    pub path: String,
}

impl Attachment {
    pub fn new(url: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    /// Whether deleting this attachment must release a stored object.
    pub fn is_stored(&self) -> bool {
        !self.path.is_empty()
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// A tracked ticket as held by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Store-assigned identifier.
    pub id: String,
    /// Human-facing sequence number.
    pub ticket_number: u32,
    pub name: String,
    #[serde(default)]
    pub link: String,
    pub details: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub status: TicketStatus,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Ticket {
    /// Assemble a stored ticket from its identity and editable fields.
    pub fn from_draft(id: impl Into<String>, ticket_number: u32, draft: TicketDraft) -> Self {
        Self {
            id: id.into(),
            ticket_number,
            name: draft.name,
            link: draft.link,
            details: draft.details,
            attachments: draft.attachments,
            status: draft.status,
            date: draft.date,
            tags: draft.tags,
        }
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t == tag_id)
    }
}

/// One more than the highest ticket number, or 1 for an empty collection.
///
/// Computed from the collection the caller has loaded; two writers working
/// from the same snapshot will pick the same number.
pub fn next_ticket_number(tickets: &[Ticket]) -> u32 {
    tickets
        .iter()
        .map(|t| t.ticket_number)
        .max()
        .map_or(1, |max| max + 1)
}

// ============================================================================
// Draft
// ============================================================================

/// Validation failures reported before any store call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Company name is required")]
    EmptyName,

    #[error("Details are required")]
    EmptyDetails,

    #[error("Unknown tag: {0}")]
    UnknownTag(String),
}

/// The editable field set of a ticket.
///
/// Backs the new/edit form, the create/update payload sent to the store,
/// and the output of the import normalizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketDraft {
    pub name: String,
    #[serde(default)]
    pub link: String,
    pub details: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default = "text::today")]
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Default for TicketDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            link: String::new(),
            details: String::new(),
            attachments: Vec::new(),
            status: TicketStatus::Pending,
            date: text::today(),
            tags: Vec::new(),
        }
    }
}

impl From<&Ticket> for TicketDraft {
    fn from(ticket: &Ticket) -> Self {
        Self {
            name: ticket.name.clone(),
            link: ticket.link.clone(),
            details: ticket.details.clone(),
            attachments: ticket.attachments.clone(),
            status: ticket.status,
            date: ticket.date.clone(),
            tags: ticket.tags.clone(),
        }
    }
}

impl TicketDraft {
    /// An empty draft dated today.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the tag if absent, remove it if present.
    pub fn toggle_tag(&mut self, tag_id: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag_id) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag_id.to_string());
        }
    }

    /// Check the fields required for a save.
    pub fn validate(&self, tags: &TagCatalog) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.details.trim().is_empty() {
            return Err(ValidationError::EmptyDetails);
        }
        if let Some(unknown) = self.tags.iter().find(|t| !tags.contains(t)) {
            return Err(ValidationError::UnknownTag(unknown.clone()));
        }
        Ok(())
    }
}
