use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use ticketdesk_core::{SanitizedConfig, TicketStatus};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// A selectable ticket status.
#[derive(Serialize)]
pub struct StatusOption {
    pub id: &'static str,
    pub label: &'static str,
}

/// Sanitized config plus the vocabularies a form needs.
#[derive(Serialize)]
pub struct ConfigResponse {
    #[serde(flatten)]
    pub config: SanitizedConfig,
    pub statuses: Vec<StatusOption>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let statuses = TicketStatus::ALL
        .iter()
        .map(|s| StatusOption {
            id: s.as_str(),
            label: s.label(),
        })
        .collect();

    Json(ConfigResponse {
        config: state.sanitized_config(),
        statuses,
    })
}

/// Prometheus scrape endpoint
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
