//! Stateless ticket actions over the ticket and object stores.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::attachment::{
    delete_attachments, upload_all, CleanupReport, FileClassifier, ObjectStore, StorageError,
    UploadFile,
};
use crate::config::{Config, TagCatalog, DEFAULT_MAX_FILE_SIZE};
use crate::metrics;
use crate::ticket::{next_ticket_number, Attachment, Ticket, TicketDraft, TicketStore};
use crate::transfer::{parse_import, serialize_backup, ImportNormalizer};

use super::types::{Confirmation, DeleteOutcome, ImportOutcome, WorkflowError};
use super::view::TicketView;

fn observe(backend: &str, operation: &str, started: Instant) {
    metrics::BACKEND_DURATION
        .with_label_values(&[backend, operation])
        .observe(started.elapsed().as_secs_f64());
}

/// Ticket actions shared by every caller.
///
/// Holds no collection state: each call goes to the stores. Validation and
/// size limits are checked before any store call.
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    objects: Arc<dyn ObjectStore>,
    tags: TagCatalog,
    classifier: FileClassifier,
    max_file_size: u64,
}

impl TicketService {
    /// Create a service with the default tag vocabulary and size limit.
    pub fn new(tickets: Arc<dyn TicketStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            tickets,
            objects,
            tags: TagCatalog::default(),
            classifier: FileClassifier::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create a service configured from the loaded config.
    pub fn from_config(
        tickets: Arc<dyn TicketStore>,
        objects: Arc<dyn ObjectStore>,
        config: &Config,
    ) -> Self {
        Self::new(tickets, objects)
            .with_tags(config.tags.clone())
            .with_classifier(FileClassifier::new(&config.storage.image_extensions))
            .with_max_file_size(config.storage.max_file_size)
    }

    pub fn with_tags(mut self, tags: TagCatalog) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_classifier(mut self, classifier: FileClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn tags(&self) -> &TagCatalog {
        &self.tags
    }

    pub fn classifier(&self) -> &FileClassifier {
        &self.classifier
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// All tickets, newest first.
    pub async fn list(&self) -> Result<Vec<Ticket>, WorkflowError> {
        let started = Instant::now();
        let tickets = self.tickets.list().await?;
        observe(self.tickets.name(), "list", started);
        Ok(tickets)
    }

    pub async fn get(&self, id: &str) -> Result<Ticket, WorkflowError> {
        self.tickets
            .get(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))
    }

    /// One more than the highest number currently stored.
    pub async fn next_number(&self) -> Result<u32, WorkflowError> {
        Ok(next_ticket_number(&self.list().await?))
    }

    /// Validate and create a ticket numbered `ticket_number`.
    pub async fn create(
        &self,
        ticket_number: u32,
        draft: &TicketDraft,
    ) -> Result<Ticket, WorkflowError> {
        draft.validate(&self.tags)?;

        let started = Instant::now();
        let ticket = self.tickets.create(ticket_number, draft).await?;
        observe(self.tickets.name(), "create", started);

        metrics::TICKETS_CREATED.with_label_values(&["form"]).inc();
        info!(ticket_id = %ticket.id, ticket_number, "Created ticket");
        Ok(ticket)
    }

    /// Validate and replace the editable fields of ticket `id`.
    pub async fn update(&self, id: &str, draft: &TicketDraft) -> Result<Ticket, WorkflowError> {
        draft.validate(&self.tags)?;

        let started = Instant::now();
        let ticket = self.tickets.update(id, draft).await?;
        observe(self.tickets.name(), "update", started);

        metrics::TICKETS_UPDATED.inc();
        info!(ticket_id = %id, "Updated ticket");
        Ok(ticket)
    }

    /// Release a ticket's attachments, then delete its record.
    pub async fn delete(
        &self,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, WorkflowError> {
        if confirmation == Confirmation::Declined {
            debug!(ticket_id = %id, "Delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let ticket = self.get(id).await?;
        let cleanup = self.release_all(&ticket.attachments).await;

        let started = Instant::now();
        self.tickets.delete(id).await?;
        observe(self.tickets.name(), "delete", started);

        metrics::TICKETS_DELETED.inc();
        info!(
            ticket_id = %id,
            attachments_removed = cleanup.removed,
            cleanup_warnings = cleanup.warnings.len(),
            "Deleted ticket"
        );
        Ok(DeleteOutcome::Deleted {
            removed: 1,
            cleanup,
        })
    }

    /// Release every ticket's attachments, then delete all records.
    pub async fn delete_all(&self, confirmation: Confirmation) -> Result<DeleteOutcome, WorkflowError> {
        if confirmation == Confirmation::Declined {
            debug!("Delete-all declined");
            return Ok(DeleteOutcome::Declined);
        }

        let tickets = self.list().await?;
        let mut cleanup = CleanupReport::default();
        for ticket in &tickets {
            cleanup.merge(self.release_all(&ticket.attachments).await);
        }

        let started = Instant::now();
        let removed = self.tickets.delete_all().await?;
        observe(self.tickets.name(), "delete_all", started);

        metrics::TICKETS_DELETED.inc_by(removed);
        info!(
            removed,
            attachments_removed = cleanup.removed,
            cleanup_warnings = cleanup.warnings.len(),
            "Deleted all tickets"
        );
        Ok(DeleteOutcome::Deleted { removed, cleanup })
    }

    /// Parse an import file and bulk-create its drafts from `start_number`.
    pub async fn import(
        &self,
        start_number: u32,
        bytes: &[u8],
    ) -> Result<ImportOutcome, WorkflowError> {
        let payload = parse_import(bytes).map_err(|e| {
            metrics::IMPORTS_TOTAL.with_label_values(&["invalid"]).inc();
            WorkflowError::InvalidImport(e)
        })?;

        let drafts = ImportNormalizer::new(&self.tags).normalize(&payload);
        if drafts.is_empty() {
            metrics::IMPORTS_TOTAL.with_label_values(&["empty"]).inc();
            info!("Import file held no tickets");
            return Ok(ImportOutcome::Empty);
        }

        let started = Instant::now();
        let created = self.tickets.bulk_create(start_number, &drafts).await?;
        observe(self.tickets.name(), "bulk_create", started);

        metrics::IMPORTS_TOTAL.with_label_values(&["imported"]).inc();
        metrics::TICKETS_CREATED
            .with_label_values(&["import"])
            .inc_by(created.len() as u64);
        info!(count = created.len(), start_number, "Imported tickets");
        Ok(ImportOutcome::Imported(created))
    }

    /// Backup of every stored ticket.
    pub async fn export(&self) -> Result<String, WorkflowError> {
        let tickets = self.list().await?;
        serialize_backup(&tickets).map_err(WorkflowError::Export)
    }

    /// Upload files in order, stopping at the first failure.
    pub async fn upload(&self, files: &[UploadFile]) -> Result<Vec<Attachment>, WorkflowError> {
        let started = Instant::now();
        let result = upload_all(self.objects.as_ref(), files, self.max_file_size).await;
        observe(self.objects.name(), "upload", started);

        match result {
            Ok(attachments) => {
                metrics::ATTACHMENTS_UPLOADED.inc_by(attachments.len() as u64);
                Ok(attachments)
            }
            Err(e) => {
                let reason = match e.source {
                    StorageError::TooLarge { .. } => "too_large",
                    _ => "backend",
                };
                metrics::UPLOAD_BATCHES_FAILED
                    .with_label_values(&[reason])
                    .inc();
                metrics::ATTACHMENTS_UPLOADED.inc_by(e.uploaded.len() as u64);
                Err(WorkflowError::Upload(e))
            }
        }
    }

    /// Delete the stored object behind one attachment, if any.
    pub async fn release(&self, attachment: &Attachment) -> CleanupReport {
        self.release_all(std::slice::from_ref(attachment)).await
    }

    async fn release_all(&self, attachments: &[Attachment]) -> CleanupReport {
        let report = delete_attachments(self.objects.as_ref(), attachments).await;
        if !report.is_clean() {
            metrics::CLEANUP_WARNINGS.inc_by(report.warnings.len() as u64);
            warn!(
                failed = report.warnings.len(),
                "Some stored attachments could not be deleted"
            );
        }
        report
    }

    /// Detail view of a ticket.
    pub fn view(&self, ticket: Ticket) -> TicketView {
        TicketView::new(ticket, &self.classifier)
    }
}
