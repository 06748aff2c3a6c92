//! Mapping of workflow failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use ticketdesk_core::attachment::StorageError;
use ticketdesk_core::ticket::Attachment;
use ticketdesk_core::WorkflowError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Files stored before an upload batch stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<Vec<Attachment>>,
}

/// A failed API call.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                uploaded: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn confirmation_required() -> Self {
        Self::bad_request("Deletion must be confirmed with confirm=true")
    }
}

fn storage_status(e: &StorageError) -> StatusCode {
    match e {
        StorageError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        StorageError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        StorageError::Io(_) | StorageError::Remote(_) => StatusCode::BAD_GATEWAY,
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        let status = match &e {
            WorkflowError::Validation(_) | WorkflowError::InvalidImport(_) => {
                StatusCode::BAD_REQUEST
            }
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Upload(batch) => storage_status(&batch.source),
            WorkflowError::Store(_) => StatusCode::BAD_GATEWAY,
            WorkflowError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %e, "Request failed");
        }

        let uploaded = match e {
            WorkflowError::Upload(ref batch) if !batch.uploaded.is_empty() => {
                Some(batch.uploaded.clone())
            }
            _ => None,
        };

        Self {
            status,
            body: ErrorResponse {
                error: e.to_string(),
                uploaded,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
