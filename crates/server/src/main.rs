use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticketdesk_core::{
    load_config, validate_config, Config, DatabaseBackend, FsObjectStore, ObjectStore,
    RestTicketStore, SqliteTicketStore, StorageBackend, SupabaseObjectStore, TicketStore,
};
use ticketdesk_server::api::create_router;
use ticketdesk_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TICKETDESK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        config_hash = &config_hash[..16],
        database = ?config.database.backend,
        storage = ?config.storage.backend,
        tags = config.tags.len(),
        "Configuration loaded successfully"
    );

    let ticket_store = create_ticket_store(&config)?;
    info!("Ticket store initialized: {}", ticket_store.name());

    let object_store = create_object_store(&config)?;
    info!("Object store initialized: {}", object_store.name());

    let state = Arc::new(AppState::new(config.clone(), ticket_store, object_store));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

fn create_ticket_store(config: &Config) -> Result<Arc<dyn TicketStore>> {
    let store: Arc<dyn TicketStore> = match config.database.backend {
        DatabaseBackend::Sqlite => {
            info!("Database path: {:?}", config.database.path);
            Arc::new(
                SqliteTicketStore::new(&config.database.path)
                    .context("Failed to create ticket store")?,
            )
        }
        DatabaseBackend::Postgrest => {
            let supabase = config
                .supabase
                .as_ref()
                .context("postgrest backend selected but no [supabase] config provided")?;
            Arc::new(RestTicketStore::new(supabase).context("Failed to create ticket store")?)
        }
    };
    Ok(store)
}

fn create_object_store(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    let storage = &config.storage;
    let store: Arc<dyn ObjectStore> = match storage.backend {
        StorageBackend::Fs => {
            std::fs::create_dir_all(&storage.root)
                .with_context(|| format!("Failed to create storage root {:?}", storage.root))?;
            Arc::new(FsObjectStore::new(
                storage.root.clone(),
                storage.public_base_url.clone(),
            ))
        }
        StorageBackend::Supabase => {
            let supabase = config
                .supabase
                .as_ref()
                .context("supabase storage selected but no [supabase] config provided")?;
            Arc::new(
                SupabaseObjectStore::new(supabase, storage.bucket.clone())
                    .context("Failed to create object store")?,
            )
        }
    };
    Ok(store)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
