//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketdesk_core::attachment::CleanupReport;
use ticketdesk_core::ticket::{next_ticket_number, TicketFilter, TicketStats};
use ticketdesk_core::workflow::{DeleteOutcome, TicketView};
use ticketdesk_core::{Confirmation, Ticket, TicketDraft, TicketStatus, WorkflowError};

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// Case-insensitive text matched against name and details
    pub search: Option<String>,
    /// Filter by status (`pending`, `in-progress`, `completed`)
    pub status: Option<String>,
    /// Filter by tag id
    pub tag: Option<String>,
}

/// Query parameters for destructive actions
#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    #[serde(default)]
    pub confirm: bool,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<Ticket>,
    /// Counters over the whole collection, not just the filtered page
    pub stats: TicketStats,
    pub next_ticket_number: u32,
}

/// Response for delete actions
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub removed: u64,
    pub cleanup: CleanupReport,
}

fn parse_status(value: Option<&str>) -> Result<Option<TicketStatus>, ApiError> {
    match value.map(str::trim).filter(|s| !s.is_empty() && *s != "all") {
        None => Ok(None),
        Some(raw) => TicketStatus::parse(raw)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown status: {}", raw))),
    }
}

fn delete_response(outcome: DeleteOutcome) -> Result<Json<DeleteResponse>, ApiError> {
    match outcome {
        DeleteOutcome::Declined => Err(ApiError::confirmation_required()),
        DeleteOutcome::Deleted { removed, cleanup } => {
            Ok(Json(DeleteResponse { removed, cleanup }))
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List tickets with optional filters
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let mut filter = TicketFilter::new();
    if let Some(search) = params.search {
        filter = filter.with_search(search);
    }
    if let Some(status) = parse_status(params.status.as_deref())? {
        filter = filter.with_status(status);
    }
    if let Some(tag) = params.tag.filter(|t| !t.is_empty() && t != "all") {
        filter = filter.with_tag(tag);
    }

    let all = state.service().list().await?;
    let stats = TicketStats::collect(&all);
    let next = next_ticket_number(&all);
    let tickets = filter.apply(&all).into_iter().cloned().collect();

    Ok(Json(ListTicketsResponse {
        tickets,
        stats,
        next_ticket_number: next,
    }))
}

/// Create a new ticket numbered after the highest stored one
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TicketDraft>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let service = state.service();
    draft
        .validate(service.tags())
        .map_err(WorkflowError::from)?;

    let number = service.next_number().await?;
    let ticket = service.create(number, &draft).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Get a ticket's detail view
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketView>, ApiError> {
    let ticket = state.service().get(&id).await?;
    Ok(Json(state.service().view(ticket)))
}

/// Replace a ticket's editable fields
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(draft): Json<TicketDraft>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state.service().update(&id, &draft).await?;
    Ok(Json(ticket))
}

/// Delete a ticket and release its stored attachments
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ConfirmParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let outcome = state
        .service()
        .delete(&id, Confirmation::from(params.confirm))
        .await?;
    delete_response(outcome)
}

/// Delete every ticket and release all stored attachments
pub async fn delete_all_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConfirmParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let outcome = state
        .service()
        .delete_all(Confirmation::from(params.confirm))
        .await?;
    delete_response(outcome)
}
