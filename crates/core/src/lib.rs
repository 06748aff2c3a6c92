pub mod attachment;
pub mod config;
pub mod metrics;
pub mod testing;
pub mod text;
pub mod ticket;
pub mod transfer;
pub mod workflow;

pub use attachment::{
    FileCategory, FileClassifier, FsObjectStore, ObjectStore, StorageError, SupabaseObjectStore,
    UploadFile,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseBackend,
    SanitizedConfig, StorageBackend,
};
pub use text::{detect_direction, TextDirection};
pub use ticket::{
    RestTicketStore, SqliteTicketStore, Ticket, TicketDraft, TicketError, TicketStatus,
    TicketStore,
};
pub use workflow::{Confirmation, TicketService, TicketWorkflow, WorkflowError};
