//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket lifecycle (created, updated, imported, deleted)
//! - Attachments (uploads, upload batch failures, cleanup warnings)
//! - Backend calls (ticket and object store latency)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Tickets
// =============================================================================

/// Tickets created total by origin.
pub static TICKETS_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketdesk_tickets_created_total", "Total tickets created"),
        &["origin"], // "form", "import"
    )
    .unwrap()
});

/// Tickets updated total.
pub static TICKETS_UPDATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("ticketdesk_tickets_updated_total", "Total ticket updates").unwrap()
});

/// Tickets deleted total.
pub static TICKETS_DELETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("ticketdesk_tickets_deleted_total", "Total tickets deleted").unwrap()
});

/// Import files processed by result.
pub static IMPORTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketdesk_imports_total", "Total import files processed"),
        &["result"], // "imported", "empty", "invalid"
    )
    .unwrap()
});

// =============================================================================
// Attachments
// =============================================================================

/// Attachments uploaded total.
pub static ATTACHMENTS_UPLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketdesk_attachments_uploaded_total",
        "Total attachments stored",
    )
    .unwrap()
});

/// Upload batches aborted by reason.
pub static UPLOAD_BATCHES_FAILED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketdesk_upload_batches_failed_total",
            "Upload batches stopped at a failing file",
        ),
        &["reason"], // "too_large", "backend"
    )
    .unwrap()
});

/// Stored objects left behind by a failed delete.
pub static CLEANUP_WARNINGS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketdesk_attachment_cleanup_warnings_total",
        "Stored objects that could not be deleted",
    )
    .unwrap()
});

// =============================================================================
// Backends
// =============================================================================

/// Backend call duration in seconds.
pub static BACKEND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketdesk_backend_duration_seconds",
            "Duration of ticket and object store calls",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["backend", "operation"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Tickets
        Box::new(TICKETS_CREATED.clone()),
        Box::new(TICKETS_UPDATED.clone()),
        Box::new(TICKETS_DELETED.clone()),
        Box::new(IMPORTS_TOTAL.clone()),
        // Attachments
        Box::new(ATTACHMENTS_UPLOADED.clone()),
        Box::new(UPLOAD_BATCHES_FAILED.clone()),
        Box::new(CLEANUP_WARNINGS.clone()),
        // Backends
        Box::new(BACKEND_DURATION.clone()),
    ]
}
