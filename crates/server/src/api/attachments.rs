//! Attachment upload and removal handlers.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use ticketdesk_core::attachment::CleanupReport;
use ticketdesk_core::ticket::Attachment;
use ticketdesk_core::UploadFile;
use tracing::info;

use super::error::ApiError;
use crate::state::AppState;

/// Response for a completed upload batch
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub attachments: Vec<Attachment>,
}

/// Upload every file part of a multipart form, in order.
///
/// The batch stops at the first failing file; attachments stored before it
/// are listed under `uploaded` in the error body.
pub async fn upload_attachments(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(ApiError::new(e.status(), e.body_text())),
        };

        // Plain form values carry no file name
        let Some(name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        match field.bytes().await {
            Ok(bytes) => files.push(UploadFile::new(name, bytes.to_vec())),
            Err(e) => {
                return Err(ApiError::new(
                    e.status(),
                    format!("Failed to read file {}: {}", name, e.body_text()),
                ))
            }
        }
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }

    let attachments = state.service().upload(&files).await?;
    info!(count = attachments.len(), "Uploaded attachments");
    Ok(Json(UploadResponse { attachments }))
}

/// Release the stored object behind an attachment removed from a draft.
///
/// Cleanup is best effort: failures come back as warnings, never as errors.
pub async fn remove_attachment(
    State(state): State<Arc<AppState>>,
    Json(attachment): Json<Attachment>,
) -> Json<CleanupReport> {
    Json(state.service().release(&attachment).await)
}
