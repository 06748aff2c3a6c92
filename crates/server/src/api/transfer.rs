//! Import and export of the ticket collection.

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use ticketdesk_core::text::today;
use ticketdesk_core::transfer::backup_file_name;
use ticketdesk_core::workflow::ImportOutcome;

use super::error::ApiError;
use crate::state::AppState;

/// Response for an import
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub notice: String,
}

/// Import a chat export or a backup file sent as the raw request body.
///
/// Tickets are numbered after the highest stored number.
pub async fn import_tickets(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let service = state.service();
    let start = service.next_number().await?;

    let response = match service.import(start, &body).await? {
        ImportOutcome::Empty => ImportResponse {
            imported: 0,
            notice: "No tickets found in the file".to_string(),
        },
        outcome @ ImportOutcome::Imported(_) => ImportResponse {
            imported: outcome.count(),
            notice: format!("Imported {} tickets", outcome.count()),
        },
    };
    Ok(Json(response))
}

/// Download every stored ticket as a dated backup file.
pub async fn export_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let backup = state.service().export().await?;
    let disposition = format!("attachment; filename=\"{}\"", backup_file_name(&today()));

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        backup,
    ))
}
