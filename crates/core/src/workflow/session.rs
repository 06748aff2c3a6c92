//! Stateful ticket session: loaded collection, draft and edit target.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::attachment::{CleanupReport, UploadFile};
use crate::ticket::{
    next_ticket_number, Ticket, TicketDraft, TicketFilter, TicketStats,
};
use crate::transfer::serialize_backup;

use super::service::TicketService;
use super::types::{Confirmation, DeleteOutcome, ImportOutcome, WorkflowError};
use super::view::TicketView;

/// One user's working session over the ticket collection.
///
/// State changes only after the store call they depend on has succeeded.
/// Every state-changing action takes `&mut self`, so actions never overlap.
pub struct TicketWorkflow {
    service: Arc<TicketService>,
    tickets: Vec<Ticket>,
    draft: TicketDraft,
    editing: Option<String>,
}

impl TicketWorkflow {
    pub fn new(service: Arc<TicketService>) -> Self {
        Self {
            service,
            tickets: Vec::new(),
            draft: TicketDraft::new(),
            editing: None,
        }
    }

    /// The loaded collection, newest first.
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn draft(&self) -> &TicketDraft {
        &self.draft
    }

    /// Mutable access to the draft's plain fields.
    pub fn draft_mut(&mut self) -> &mut TicketDraft {
        &mut self.draft
    }

    /// ID of the ticket being edited, if any.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Replace the local collection with the store's.
    pub async fn load(&mut self) -> Result<(), WorkflowError> {
        self.tickets = self.service.list().await?;
        debug!(count = self.tickets.len(), "Loaded tickets");
        Ok(())
    }

    /// Start a fresh draft.
    pub fn new_ticket(&mut self) {
        self.reset_draft();
    }

    /// Copy a loaded ticket into the draft and mark it as the edit target.
    pub fn start_edit(&mut self, id: &str) -> Result<(), WorkflowError> {
        let ticket = self
            .find(id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
        self.draft = TicketDraft::from(ticket);
        self.editing = Some(id.to_string());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.reset_draft();
    }

    /// Create or update from the draft, then reset it.
    ///
    /// A draft that fails validation is kept as is and nothing is sent.
    pub async fn save(&mut self) -> Result<Ticket, WorkflowError> {
        let saved = match &self.editing {
            Some(id) => {
                let ticket = self.service.update(id, &self.draft).await?;
                if let Some(slot) = self.tickets.iter_mut().find(|t| t.id == ticket.id) {
                    *slot = ticket.clone();
                }
                ticket
            }
            None => {
                let number = self.next_ticket_number();
                let ticket = self.service.create(number, &self.draft).await?;
                self.tickets.insert(0, ticket.clone());
                ticket
            }
        };

        self.reset_draft();
        Ok(saved)
    }

    /// Delete one ticket after its attachments.
    pub async fn delete(
        &mut self,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, WorkflowError> {
        let outcome = self.service.delete(id, confirmation).await?;
        if matches!(outcome, DeleteOutcome::Deleted { .. }) {
            self.tickets.retain(|t| t.id != id);
            if self.editing.as_deref() == Some(id) {
                self.reset_draft();
            }
        }
        Ok(outcome)
    }

    /// Delete every ticket after its attachments and clear the collection.
    pub async fn delete_all(
        &mut self,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, WorkflowError> {
        let outcome = self.service.delete_all(confirmation).await?;
        if matches!(outcome, DeleteOutcome::Deleted { .. }) {
            self.tickets.clear();
            self.reset_draft();
        }
        Ok(outcome)
    }

    /// Upload files and append them to the draft.
    ///
    /// On a failed batch the files stored before the failure are still added
    /// so they stay reachable for removal.
    pub async fn add_attachments(&mut self, files: &[UploadFile]) -> Result<usize, WorkflowError> {
        match self.service.upload(files).await {
            Ok(attachments) => {
                let count = attachments.len();
                self.draft.attachments.extend(attachments);
                Ok(count)
            }
            Err(WorkflowError::Upload(e)) => {
                self.draft.attachments.extend(e.uploaded.iter().cloned());
                Err(WorkflowError::Upload(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the draft attachment at `index`, releasing its stored object.
    ///
    /// Returns `None` when the index is out of range.
    pub async fn remove_attachment(&mut self, index: usize) -> Option<CleanupReport> {
        let attachment = self.draft.attachments.get(index)?.clone();
        let report = self.service.release(&attachment).await;
        self.draft.attachments.remove(index);
        Some(report)
    }

    pub fn toggle_tag(&mut self, tag_id: &str) {
        self.draft.toggle_tag(tag_id);
    }

    /// Import a file, numbering after the loaded collection, then reload.
    pub async fn import(&mut self, bytes: &[u8]) -> Result<ImportOutcome, WorkflowError> {
        let outcome = self
            .service
            .import(self.next_ticket_number(), bytes)
            .await?;
        if let ImportOutcome::Imported(created) = &outcome {
            info!(count = created.len(), "Import complete");
            // The tickets are committed; a failed reload must not report the import as failed.
            if let Err(e) = self.load().await {
                warn!(error = %e, "Reload after import failed, keeping created tickets locally");
                let mut merged: Vec<Ticket> = created.iter().rev().cloned().collect();
                merged.append(&mut self.tickets);
                self.tickets = merged;
            }
        }
        Ok(outcome)
    }

    /// Backup of the loaded collection.
    pub fn export(&self) -> Result<String, WorkflowError> {
        serialize_backup(&self.tickets).map_err(WorkflowError::Export)
    }

    /// One more than the highest loaded ticket number.
    pub fn next_ticket_number(&self) -> u32 {
        next_ticket_number(&self.tickets)
    }

    /// Loaded tickets that match `filter`, in collection order.
    pub fn filtered(&self, filter: &TicketFilter) -> Vec<&Ticket> {
        filter.apply(&self.tickets)
    }

    pub fn stats(&self) -> TicketStats {
        TicketStats::collect(&self.tickets)
    }

    /// Detail view of a loaded ticket.
    pub fn view(&self, id: &str) -> Result<TicketView, WorkflowError> {
        let ticket = self
            .find(id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
        Ok(self.service.view(ticket.clone()))
    }

    fn find(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    fn reset_draft(&mut self) {
        self.draft = TicketDraft::new();
        self.editing = None;
    }
}
