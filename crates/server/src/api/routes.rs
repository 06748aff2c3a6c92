use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use super::{attachments, handlers, middleware::metrics_middleware, tickets, transfer};
use crate::state::AppState;

/// Upper bound on files sent in one upload request.
const MAX_FILES_PER_UPLOAD: u64 = 20;

/// Slack for multipart boundaries and headers.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state
        .service()
        .max_file_size()
        .saturating_mul(MAX_FILES_PER_UPLOAD)
        .saturating_add(MULTIPART_OVERHEAD);
    let upload_limit = usize::try_from(upload_limit).unwrap_or(usize::MAX);
    let import_limit =
        usize::try_from(state.config().server.max_import_size).unwrap_or(usize::MAX);

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Tickets
        .route(
            "/tickets",
            get(tickets::list_tickets)
                .post(tickets::create_ticket)
                .delete(tickets::delete_all_tickets),
        )
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        // Attachments
        .route(
            "/attachments",
            post(attachments::upload_attachments)
                .delete(attachments::remove_attachment)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Backup
        .route(
            "/import",
            post(transfer::import_tickets).layer(DefaultBodyLimit::max(import_limit)),
        )
        .route("/export", get(transfer::export_tickets));

    let mut router = Router::new()
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .with_state(Arc::clone(&state));

    // Uploaded files are served locally only when they live on disk
    if let Some((base_url, root)) = state.served_files() {
        let base_url = base_url.trim_end_matches('/');
        if base_url.starts_with('/') {
            info!("Serving uploaded files from {:?} at {}", root, base_url);
            router = router.nest_service(base_url, ServeDir::new(root));
        }
    }

    router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
