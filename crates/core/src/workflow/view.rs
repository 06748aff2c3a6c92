//! Read model for a single ticket's detail view.

use serde::Serialize;

use crate::attachment::{FileCategory, FileClassifier};
use crate::text::{detect_direction, truncate_text, TextDirection};
use crate::ticket::{Attachment, Ticket};

/// Attachment labels longer than this are shortened for display.
const ATTACHMENT_LABEL_CHARS: usize = 25;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    #[serde(flatten)]
    pub attachment: Attachment,
    pub category: FileCategory,
    pub is_image: bool,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub name_direction: TextDirection,
    pub details_direction: TextDirection,
    pub status_label: &'static str,
    pub attachment_views: Vec<AttachmentView>,
}

impl TicketView {
    pub fn new(ticket: Ticket, classifier: &FileClassifier) -> Self {
        let attachment_views = ticket
            .attachments
            .iter()
            .map(|a| AttachmentView {
                attachment: a.clone(),
                category: classifier.classify(&a.name),
                is_image: classifier.is_image(&a.name),
                label: truncate_text(&a.name, ATTACHMENT_LABEL_CHARS),
            })
            .collect();

        Self {
            name_direction: detect_direction(&ticket.name),
            details_direction: detect_direction(&ticket.details),
            status_label: ticket.status.label(),
            attachment_views,
            ticket,
        }
    }
}
