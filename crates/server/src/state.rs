use std::path::PathBuf;
use std::sync::Arc;

use ticketdesk_core::{
    Config, ObjectStore, SanitizedConfig, StorageBackend, TicketService, TicketStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    ticket_store: Arc<dyn TicketStore>,
    service: TicketService,
}

impl AppState {
    pub fn new(
        config: Config,
        ticket_store: Arc<dyn TicketStore>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        let service = TicketService::from_config(Arc::clone(&ticket_store), object_store, &config);
        Self {
            config,
            ticket_store,
            service,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &TicketService {
        &self.service
    }

    pub fn ticket_store(&self) -> &dyn TicketStore {
        self.ticket_store.as_ref()
    }

    /// Local directory to serve under the public base URL, when files live on disk.
    pub fn served_files(&self) -> Option<(String, PathBuf)> {
        match self.config.storage.backend {
            StorageBackend::Fs => Some((
                self.config.storage.public_base_url.clone(),
                self.config.storage.root.clone(),
            )),
            StorageBackend::Supabase => None,
        }
    }
}
