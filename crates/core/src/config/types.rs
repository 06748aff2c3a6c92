use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default size limit of an import request body (64 MiB).
pub const DEFAULT_MAX_IMPORT_SIZE: u64 = 64 * 1024 * 1024;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub supabase: Option<SupabaseConfig>,
    #[serde(default)]
    pub tags: TagCatalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            supabase: None,
            tags: TagCatalog::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted import file, in bytes.
    #[serde(default = "default_max_import_size")]
    pub max_import_size: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_import_size: default_max_import_size(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_max_import_size() -> u64 {
    DEFAULT_MAX_IMPORT_SIZE
}

/// Ticket table backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseBackend {
    /// Local SQLite file.
    #[default]
    Sqlite,
    /// Hosted `tickets` table behind a PostgREST endpoint.
    Postgrest,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("ticketdesk.db")
}

/// Object store backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Files kept under a local directory and served by this process.
    #[default]
    Fs,
    /// Supabase storage bucket.
    Supabase,
}

/// Attachment storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Base URL under which filesystem objects are publicly reachable.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Bucket name for the Supabase backend.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Maximum size of a single uploaded file, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Extensions (lowercase, without dot) rendered as images.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            public_base_url: default_public_base_url(),
            bucket: default_bucket(),
            max_file_size: default_max_file_size(),
            image_extensions: default_image_extensions(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("attachments")
}

fn default_public_base_url() -> String {
    "/files".to_string()
}

fn default_bucket() -> String {
    "attachments".to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_image_extensions() -> Vec<String> {
    crate::attachment::DEFAULT_IMAGE_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

/// Hosted backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupabaseConfig {
    /// Project URL (e.g., "https://xyz.supabase.co")
    pub url: String,
    /// API key sent as `apikey` and bearer token
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// A tag users can attach to tickets.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TagDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl TagDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

/// The configured tag vocabulary.
///
/// Loaded once at startup and handed to the import normalizer and draft
/// validation as a read-only dependency.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TagCatalog {
    tags: Vec<TagDefinition>,
}

impl Default for TagCatalog {
    fn default() -> Self {
        Self {
            tags: vec![TagDefinition {
                id: "faroqat".to_string(),
                name: "فروقات".to_string(),
                color: Some("bg-amber-500".to_string()),
            }],
        }
    }
}

impl TagCatalog {
    pub fn new(tags: Vec<TagDefinition>) -> Self {
        Self { tags }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tags.iter().any(|t| t.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&TagDefinition> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagDefinition> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase: Option<SanitizedSupabaseConfig>,
    pub tags: TagCatalog,
}

/// Sanitized hosted backend config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSupabaseConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            storage: config.storage.clone(),
            supabase: config.supabase.as_ref().map(|s| SanitizedSupabaseConfig {
                url: s.url.clone(),
                api_key_configured: !s.api_key.is_empty(),
                timeout_secs: s.timeout_secs,
            }),
            tags: config.tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(config.database.path.to_str().unwrap(), "ticketdesk.db");
        assert_eq!(config.storage.backend, StorageBackend::Fs);
        assert_eq!(config.storage.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.server.max_import_size, DEFAULT_MAX_IMPORT_SIZE);
        assert!(config.supabase.is_none());
        assert!(config.tags.contains("faroqat"));
    }

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_custom_tags_replace_defaults() {
        let toml = r#"
[[tags]]
id = "urgent"
name = "عاجل"
color = "bg-red-500"

[[tags]]
id = "review"
name = "مراجعة"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.tags.len(), 2);
        assert!(config.tags.contains("urgent"));
        assert!(config.tags.contains("review"));
        assert!(!config.tags.contains("faroqat"));
        assert_eq!(config.tags.get("review").unwrap().color, None);
    }

    #[test]
    fn test_deserialize_supabase_backends() {
        let toml = r#"
[database]
backend = "postgrest"

[storage]
backend = "supabase"
bucket = "files"
max_file_size = 1024

[supabase]
url = "https://example.supabase.co"
api_key = "anon-key"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Postgrest);
        assert_eq!(config.storage.backend, StorageBackend::Supabase);
        assert_eq!(config.storage.bucket, "files");
        assert_eq!(config.storage.max_file_size, 1024);

        let supabase = config.supabase.as_ref().unwrap();
        assert_eq!(supabase.url, "https://example.supabase.co");
        assert_eq!(supabase.timeout_secs, 30);
    }

    #[test]
    fn test_default_image_extensions() {
        let storage = StorageConfig::default();
        assert_eq!(
            storage.image_extensions,
            vec!["jpg", "jpeg", "png", "gif", "webp", "svg"]
        );
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config = Config {
            supabase: Some(SupabaseConfig {
                url: "https://example.supabase.co".to_string(),
                api_key: "secret-key".to_string(),
                timeout_secs: 10,
            }),
            ..Config::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let supabase = sanitized.supabase.as_ref().unwrap();
        assert!(supabase.api_key_configured);
        assert_eq!(supabase.timeout_secs, 10);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
