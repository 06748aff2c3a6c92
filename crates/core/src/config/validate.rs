use std::collections::HashSet;

use super::{
    types::{Config, DatabaseBackend, StorageBackend},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upload and import size limits are positive
/// - Tag ids are non-empty and unique
/// - Hosted backends have a `[supabase]` section
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.max_import_size == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_import_size cannot be 0".to_string(),
        ));
    }

    if config.storage.max_file_size == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_file_size cannot be 0".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for tag in config.tags.iter() {
        if tag.id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tag id cannot be empty".to_string(),
            ));
        }
        if !seen.insert(tag.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate tag id: {}",
                tag.id
            )));
        }
    }

    let needs_supabase = config.database.backend == DatabaseBackend::Postgrest
        || config.storage.backend == StorageBackend::Supabase;
    match &config.supabase {
        None if needs_supabase => {
            return Err(ConfigError::ValidationError(
                "[supabase] section is required by the configured backends".to_string(),
            ));
        }
        Some(supabase) if needs_supabase && supabase.url.trim().is_empty() => {
            return Err(ConfigError::ValidationError(
                "supabase.url cannot be empty".to_string(),
            ));
        }
        _ => {}
    }

    Ok(())
}
